//! Collaboration invite entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use storyhub_core::types::id::{AuthorId, CollaborationInviteId, StoryId};

/// Derived state of an invite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Active and not yet answered.
    Pending,
    /// The invitee accepted.
    Accepted,
    /// The invitee declined.
    Declined,
    /// Cancelled by the inviter, or closed by removal or leaving.
    Closed,
}

/// Durable record of an offer to collaborate on a story.
///
/// Records are never deleted; `active` flips to `false` when the invite is
/// accepted, declined, cancelled, or its collaborator entry goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CollaborationInvite {
    /// Unique invite identifier.
    pub id: CollaborationInviteId,
    /// Story the invite targets.
    pub story_id: StoryId,
    /// The inviting author (owner or editing collaborator).
    pub author_id: AuthorId,
    /// Invitee account; `None` until someone registers with `email`.
    pub invited: Option<AuthorId>,
    /// Invitee address, stored lowercase.
    pub email: String,
    /// Requested edit permission.
    pub edit: bool,
    /// Whether the invite is still open.
    pub active: bool,
    /// `None` while unanswered.
    pub accepted: Option<bool>,
    /// When the invite was created.
    pub created_at: DateTime<Utc>,
    /// When the invite last changed.
    pub updated_at: DateTime<Utc>,
}

impl CollaborationInvite {
    /// Create a new active invite.
    pub fn new(
        story_id: StoryId,
        author_id: AuthorId,
        invited: Option<AuthorId>,
        email: &str,
        edit: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CollaborationInviteId::new(),
            story_id,
            author_id,
            invited,
            email: email.trim().to_lowercase(),
            edit,
            active: true,
            accepted: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived lifecycle state.
    pub fn status(&self) -> InviteStatus {
        match (self.active, self.accepted) {
            (true, _) => InviteStatus::Pending,
            (false, Some(true)) => InviteStatus::Accepted,
            (false, Some(false)) => InviteStatus::Declined,
            (false, None) => InviteStatus::Closed,
        }
    }

    /// Whether the invite is still waiting for an answer.
    pub fn is_pending(&self) -> bool {
        self.status() == InviteStatus::Pending
    }
}
