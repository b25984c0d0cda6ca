use async_trait::async_trait;
use chrono::Utc;

use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, PageId, StoryId};
use storyhub_entity::page::Page;
use storyhub_entity::story::{AddCollaboratorOutcome, Collaborator, Story};

use super::MemoryStore;
use crate::store::{PageStore, StoryStore};

#[async_trait]
impl StoryStore for MemoryStore {
    async fn find_by_id(&self, id: StoryId) -> AppResult<Option<Story>> {
        Ok(self.stories.get(&id).map(|s| s.clone()))
    }

    async fn create(&self, story: &Story) -> AppResult<Story> {
        if self.stories.contains_key(&story.id) {
            return Err(AppError::conflict(format!("Story {} already exists", story.id)));
        }
        self.stories.insert(story.id, story.clone());
        Ok(story.clone())
    }

    async fn add_collaborator(
        &self,
        story_id: StoryId,
        collaborator: Collaborator,
    ) -> AppResult<AddCollaboratorOutcome> {
        let Some(mut story) = self.stories.get_mut(&story_id) else {
            return Ok(AddCollaboratorOutcome::StoryMissing);
        };
        if story.is_deleted() {
            return Ok(AddCollaboratorOutcome::StoryMissing);
        }
        let owner = story.owner_id;
        let outcome = story.collaborators.insert(owner, collaborator);
        if outcome == AddCollaboratorOutcome::Inserted {
            story.updated_at = Utc::now();
        }
        Ok(outcome)
    }

    async fn set_collaborator_edit(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<bool> {
        let Some(mut story) = self.stories.get_mut(&story_id) else {
            return Ok(false);
        };
        let updated = story.collaborators.set_edit(&author_id, edit);
        if updated {
            story.updated_at = Utc::now();
        }
        Ok(updated)
    }

    async fn remove_collaborators(
        &self,
        story_id: StoryId,
        author_ids: &[AuthorId],
    ) -> AppResult<Vec<AuthorId>> {
        let Some(mut story) = self.stories.get_mut(&story_id) else {
            return Ok(Vec::new());
        };
        let removed: Vec<AuthorId> = author_ids
            .iter()
            .filter(|id| story.collaborators.remove(id).is_some())
            .copied()
            .collect();
        if !removed.is_empty() {
            story.updated_at = Utc::now();
        }
        Ok(removed)
    }

    async fn soft_delete(&self, story_id: StoryId) -> AppResult<bool> {
        let Some(mut story) = self.stories.get_mut(&story_id) else {
            return Ok(false);
        };
        if story.is_deleted() {
            return Ok(false);
        }
        let now = Utc::now();
        story.deleted_at = Some(now);
        story.updated_at = now;
        Ok(true)
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn create(&self, page: &Page) -> AppResult<Page> {
        self.pages.insert(page.id, page.clone());
        Ok(page.clone())
    }

    async fn find_by_story_and_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
    ) -> AppResult<Vec<Page>> {
        let mut pages: Vec<Page> = self
            .pages
            .iter()
            .filter(|p| p.story_id == story_id && p.author_id == author_id)
            .map(|p| p.clone())
            .collect();
        pages.sort_by_key(|p| (p.created_at, p.id));
        Ok(pages)
    }

    async fn delete_many(&self, ids: &[PageId]) -> AppResult<u64> {
        Ok(ids.iter().filter(|id| self.pages.remove(id).is_some()).count() as u64)
    }
}
