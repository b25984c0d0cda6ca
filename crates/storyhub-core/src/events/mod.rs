//! Activity events emitted by StoryHub mutations.
//!
//! Events are handed to an [`ActivityNotifier`](crate::traits::ActivityNotifier)
//! after the mutation has been applied and are consumed by the notification
//! worker. Emission never blocks and never fails the mutation.

pub mod collaboration;
pub mod group;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{AuthorId, EventId};

pub use collaboration::CollaborationEvent;
pub use group::GroupEvent;

/// Wire name of an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A collaborator was added to a story.
    CollaboratorAdded,
    /// The owner removed a collaborator (or cancelled their invitation).
    CollaborationRemoved,
    /// A collaborator left a story.
    CollaborationLeft,
    /// An invitee declined a collaboration invitation.
    CollaborationShareFalse,
    /// An author joined a group.
    GroupMemberAdded,
    /// An author left or was removed from a group.
    GroupMemberRemoved,
    /// A group invitation was issued.
    GroupInviteSent,
}

impl ActivityKind {
    /// Stable string form used by notification templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollaboratorAdded => "collaborator_added",
            Self::CollaborationRemoved => "collaboration_removed",
            Self::CollaborationLeft => "collaboration_left",
            Self::CollaborationShareFalse => "collaboration_share_false",
            Self::GroupMemberAdded => "group_member_added",
            Self::GroupMemberRemoved => "group_member_removed",
            Self::GroupInviteSent => "group_invite_sent",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrapper for all activity events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Unique event ID.
    pub id: EventId,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
    /// The author who caused the event.
    pub actor_id: AuthorId,
    /// The event payload.
    pub payload: ActivityPayload,
}

/// Union of all activity payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum ActivityPayload {
    /// A story collaboration event.
    Collaboration(CollaborationEvent),
    /// An account group event.
    Group(GroupEvent),
}

impl ActivityEvent {
    /// Create a new activity event stamped with the current time.
    pub fn new(actor_id: AuthorId, payload: ActivityPayload) -> Self {
        Self {
            id: EventId::new(),
            occurred_at: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Create a collaboration event.
    pub fn collaboration(actor_id: AuthorId, event: CollaborationEvent) -> Self {
        Self::new(actor_id, ActivityPayload::Collaboration(event))
    }

    /// Create a group event.
    pub fn group(actor_id: AuthorId, event: GroupEvent) -> Self {
        Self::new(actor_id, ActivityPayload::Group(event))
    }

    /// The wire kind of this event.
    pub fn kind(&self) -> ActivityKind {
        match &self.payload {
            ActivityPayload::Collaboration(e) => e.kind(),
            ActivityPayload::Group(e) => e.kind(),
        }
    }
}
