//! Delivery channels invoked by the notification worker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::id::AuthorId;

/// An email ready to be handed to a mail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Template key (the activity kind).
    pub template: String,
}

/// A push notification addressed to an author's devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Recipient author.
    pub recipient: AuthorId,
    /// Short title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Template key (the activity kind).
    pub template: String,
}

/// Email transport.
#[async_trait]
pub trait EmailSender: Send + Sync + std::fmt::Debug + 'static {
    /// Send a single email.
    async fn send(&self, message: EmailMessage) -> AppResult<()>;
}

/// Push transport.
#[async_trait]
pub trait PushSender: Send + Sync + std::fmt::Debug + 'static {
    /// Send a single push notification.
    async fn send(&self, message: PushMessage) -> AppResult<()>;
}
