//! Story collaboration events.

use serde::{Deserialize, Serialize};

use super::ActivityKind;
use crate::types::id::{AuthorId, CollaborationInviteId, StoryId};

/// Events related to story collaboration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollaborationEvent {
    /// A collaborator was invited and, when they have an account, added.
    Added {
        /// The story.
        story_id: StoryId,
        /// The invite record that traces the addition.
        invite_id: CollaborationInviteId,
        /// The added author, absent for email-only invitations.
        author_id: Option<AuthorId>,
        /// Address the invitation was sent to.
        email: String,
        /// Whether edit access was granted.
        edit: bool,
    },
    /// A collaborator was removed by the owner.
    Removed {
        /// The story.
        story_id: StoryId,
        /// The removed author, absent for cancelled email-only invitations.
        author_id: Option<AuthorId>,
        /// Invitation address, when known.
        email: Option<String>,
    },
    /// A collaborator removed themself.
    Left {
        /// The story.
        story_id: StoryId,
        /// The leaving author.
        author_id: AuthorId,
        /// Pages purged as part of leaving.
        pages_deleted: u64,
    },
    /// The invitee declined the invitation.
    ShareDeclined {
        /// The story.
        story_id: StoryId,
        /// The invite that was declined.
        invite_id: CollaborationInviteId,
        /// The declining author.
        author_id: AuthorId,
    },
}

impl CollaborationEvent {
    /// Wire kind of this event.
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::Added { .. } => ActivityKind::CollaboratorAdded,
            Self::Removed { .. } => ActivityKind::CollaborationRemoved,
            Self::Left { .. } => ActivityKind::CollaborationLeft,
            Self::ShareDeclined { .. } => ActivityKind::CollaborationShareFalse,
        }
    }

    /// The story this event concerns.
    pub fn story_id(&self) -> StoryId {
        match self {
            Self::Added { story_id, .. }
            | Self::Removed { story_id, .. }
            | Self::Left { story_id, .. }
            | Self::ShareDeclined { story_id, .. } => *story_id,
        }
    }
}
