//! Page entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use storyhub_core::types::id::{AuthorId, PageId, StoryId};

/// A page of content inside a story, written by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Page {
    /// Unique page identifier.
    pub id: PageId,
    /// Story the page belongs to.
    pub story_id: StoryId,
    /// Author who wrote the page.
    pub author_id: AuthorId,
    /// Page title.
    pub title: String,
    /// When the page was created.
    pub created_at: DateTime<Utc>,
}

impl Page {
    /// Create a new page.
    pub fn new(story_id: StoryId, author_id: AuthorId, title: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            story_id,
            author_id,
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}
