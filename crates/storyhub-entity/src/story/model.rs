//! Story entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storyhub_core::types::id::{AuthorId, StoryId};

use super::collaborators::Collaborators;

/// Public sharing flags of a story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSettings {
    /// Visible to the owner's followers.
    #[serde(default)]
    pub followers: bool,
    /// Visible to anyone holding the link.
    #[serde(default)]
    pub link: bool,
    /// Listed in search and visible to everyone.
    #[serde(default)]
    pub search: bool,
}

/// A shared document owned by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique story identifier.
    pub id: StoryId,
    /// The owning author. Never reassigned.
    pub owner_id: AuthorId,
    /// Story title.
    pub title: String,
    /// Public sharing flags.
    pub share: ShareSettings,
    /// Authors granted view or edit access.
    pub collaborators: Collaborators,
    /// Soft-deletion marker.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
    /// When the story was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Whether the author owns this story.
    pub fn is_owner(&self, author_id: AuthorId) -> bool {
        self.owner_id == author_id
    }

    /// Whether the story has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Data required to create a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStory {
    /// The owning author.
    pub owner_id: AuthorId,
    /// Story title.
    pub title: String,
    /// Initial sharing flags.
    #[serde(default)]
    pub share: ShareSettings,
}

impl CreateStory {
    /// Build the entity with a fresh id and no collaborators.
    pub fn into_story(self) -> Story {
        let now = Utc::now();
        Story {
            id: StoryId::new(),
            owner_id: self.owner_id,
            title: self.title,
            share: self.share,
            collaborators: Collaborators::new(),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
