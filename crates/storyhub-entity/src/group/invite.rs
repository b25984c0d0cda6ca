//! Group invite entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use storyhub_core::types::id::{AuthorId, GroupId, GroupInviteId};

/// An invitation to join a group, redeemable by its opaque token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupInvite {
    /// Unique invite identifier.
    pub id: GroupInviteId,
    /// Group the invite targets.
    pub group_id: GroupId,
    /// The inviting owner.
    pub author_id: AuthorId,
    /// Invitee account; `None` until someone registers with `email`.
    pub invited: Option<AuthorId>,
    /// Invitee address, stored lowercase.
    pub email: String,
    /// Opaque acceptance token.
    #[serde(skip_serializing)]
    pub token: String,
    /// Whether the invite is still open.
    pub active: bool,
    /// `None` while unanswered.
    pub accepted: Option<bool>,
    /// When the invite was created.
    pub created_at: DateTime<Utc>,
    /// When the invite last changed.
    pub updated_at: DateTime<Utc>,
}

impl GroupInvite {
    /// Create a new active invite.
    pub fn new(
        group_id: GroupId,
        author_id: AuthorId,
        invited: Option<AuthorId>,
        email: &str,
        token: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GroupInviteId::new(),
            group_id,
            author_id,
            invited,
            email: email.trim().to_lowercase(),
            token,
            active: true,
            accepted: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the invite has already been answered or cancelled.
    pub fn is_resolved(&self) -> bool {
        !self.active
    }
}
