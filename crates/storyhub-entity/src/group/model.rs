//! Group entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use storyhub_core::types::id::{AuthorId, GroupId};

/// A member entry of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct GroupMember {
    /// The member.
    pub author_id: AuthorId,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// A set of authors pooling one storage quota under one owner.
///
/// The owner is never listed in `members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: GroupId,
    /// The owning author.
    pub owner_id: AuthorId,
    /// Members in join order.
    pub members: Vec<GroupMember>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create an empty group for an owner.
    pub fn new(owner_id: AuthorId) -> Self {
        Self {
            id: GroupId::new(),
            owner_id,
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the author owns this group.
    pub fn is_owner(&self, author_id: AuthorId) -> bool {
        self.owner_id == author_id
    }

    /// Whether the author is a (non-owner) member.
    pub fn is_member(&self, author_id: AuthorId) -> bool {
        self.members.iter().any(|m| m.author_id == author_id)
    }

    /// Owner or member.
    pub fn includes(&self, author_id: AuthorId) -> bool {
        self.is_owner(author_id) || self.is_member(author_id)
    }

    /// Member ids in join order.
    pub fn member_ids(&self) -> Vec<AuthorId> {
        self.members.iter().map(|m| m.author_id).collect()
    }

    /// Owner followed by every member.
    pub fn all_authors(&self) -> Vec<AuthorId> {
        std::iter::once(self.owner_id)
            .chain(self.members.iter().map(|m| m.author_id))
            .collect()
    }
}

/// Result of trying to add a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddMemberOutcome {
    /// The author joined the group.
    Added,
    /// The author was already a member of this group.
    AlreadyMember,
    /// The author is a member of a different group.
    MemberElsewhere,
    /// The author owns this group.
    IsOwner,
    /// The author owns a different group.
    OwnsGroup,
    /// The group does not exist.
    GroupMissing,
}
