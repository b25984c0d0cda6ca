//! Pure capability resolver.
//!
//! Resolution order:
//! 1. Deleted stories grant nothing to anyone but the owner.
//! 2. Owner: view, edit, and administer.
//! 3. Collaborator: view, plus edit when the entry carries `edit`.
//! 4. Public sharing flags: view only.

use serde::{Deserialize, Serialize};

use storyhub_core::types::id::AuthorId;
use storyhub_entity::story::Story;

/// Relationship facts about the caller that the public sharing flags
/// depend on. Supplied by the caller; the resolver never looks them up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    /// The caller follows the story owner.
    #[serde(default)]
    pub follows_owner: bool,
    /// The caller arrived through the story's share link.
    #[serde(default)]
    pub has_link: bool,
}

/// Where a grant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySource {
    /// The caller owns the story.
    Owner,
    /// The caller has a collaborator entry.
    Collaborator,
    /// A public sharing flag matched.
    PublicShare,
    /// No grant applies.
    Denied,
}

/// The resolved capabilities of one author on one story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// May read the story.
    pub can_view: bool,
    /// May change content, invite, and change permissions.
    pub can_edit: bool,
    /// May cancel invitations, remove collaborators, and delete the story.
    pub can_administer: bool,
    /// The grant that produced these capabilities.
    pub source: CapabilitySource,
}

impl Capabilities {
    /// No capabilities at all.
    pub fn none() -> Self {
        Self {
            can_view: false,
            can_edit: false,
            can_administer: false,
            source: CapabilitySource::Denied,
        }
    }

    fn owner() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_administer: true,
            source: CapabilitySource::Owner,
        }
    }

    /// Whether the caller holds the story through ownership or a
    /// collaborator entry, as opposed to public sharing.
    pub fn is_participant(&self) -> bool {
        matches!(
            self.source,
            CapabilitySource::Owner | CapabilitySource::Collaborator
        )
    }
}

/// Single source of truth for story capabilities.
///
/// Stateless and side-effect free; every mutating operation consults it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Resolve what `author_id` may do on `story`.
    pub fn resolve(&self, story: &Story, author_id: AuthorId, audience: Audience) -> Capabilities {
        if story.is_owner(author_id) {
            return Capabilities::owner();
        }
        if story.is_deleted() {
            return Capabilities::none();
        }

        if let Some(entry) = story.collaborators.get(&author_id) {
            return Capabilities {
                can_view: true,
                can_edit: entry.edit,
                can_administer: false,
                source: CapabilitySource::Collaborator,
            };
        }

        let share = story.share;
        let public = share.search
            || (share.followers && audience.follows_owner)
            || (share.link && audience.has_link);
        if public {
            Capabilities {
                can_view: true,
                can_edit: false,
                can_administer: false,
                source: CapabilitySource::PublicShare,
            }
        } else {
            Capabilities::none()
        }
    }

    /// Only the owner may invite when listing collaborators.
    pub fn can_invite(&self, story: &Story, author_id: AuthorId) -> bool {
        story.is_owner(author_id)
    }
}
