//! Read-only capability lookups over stored stories.

use std::sync::Arc;

use tracing::debug;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, StoryId};
use storyhub_database::store::StoryStore;

use super::resolver::{Audience, Capabilities, PermissionResolver};

/// Loads a story and resolves an author's capabilities on it.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Story store.
    stories: Arc<dyn StoryStore>,
    /// Capability rules.
    resolver: PermissionResolver,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(stories: Arc<dyn StoryStore>) -> Self {
        Self {
            stories,
            resolver: PermissionResolver::new(),
        }
    }

    /// Resolve capabilities. A missing story resolves to no capabilities.
    pub async fn resolve_permission(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        audience: Audience,
    ) -> AppResult<Capabilities> {
        let Some(story) = self.stories.find_by_id(story_id).await? else {
            debug!(story_id = %story_id, "Permission lookup on missing story");
            return Ok(Capabilities::none());
        };
        Ok(self.resolver.resolve(&story, author_id, audience))
    }
}
