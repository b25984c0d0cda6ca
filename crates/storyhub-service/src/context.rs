//! Request context carrying the acting author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storyhub_core::types::id::AuthorId;

/// Context for the current authenticated call.
///
/// Identity is resolved upstream; every service method receives the
/// context so that it knows *who* is acting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting author.
    pub author_id: AuthorId,
    /// When the call was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for an author, stamped with the current time.
    pub fn new(author_id: AuthorId) -> Self {
        Self {
            author_id,
            request_time: Utc::now(),
        }
    }
}
