//! Account group events.

use serde::{Deserialize, Serialize};

use super::ActivityKind;
use crate::types::id::{AuthorId, GroupId, GroupInviteId};

/// Events related to group membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupEvent {
    /// An author accepted an invitation and joined.
    MemberAdded {
        /// The group.
        group_id: GroupId,
        /// The new member.
        author_id: AuthorId,
    },
    /// A member left or was removed.
    MemberRemoved {
        /// The group.
        group_id: GroupId,
        /// The former member.
        author_id: AuthorId,
        /// `true` when the member left on their own.
        left: bool,
    },
    /// The owner invited someone to join.
    InviteSent {
        /// The group.
        group_id: GroupId,
        /// The new invite.
        invite_id: GroupInviteId,
        /// Existing account the invite was attached to.
        invited: Option<AuthorId>,
        /// Address the invitation was sent to.
        email: String,
        /// Opaque acceptance token.
        token: String,
    },
}

impl GroupEvent {
    /// Wire kind of this event.
    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::MemberAdded { .. } => ActivityKind::GroupMemberAdded,
            Self::MemberRemoved { .. } => ActivityKind::GroupMemberRemoved,
            Self::InviteSent { .. } => ActivityKind::GroupInviteSent,
        }
    }
}
