//! Page repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, PageId, StoryId};
use storyhub_entity::page::Page;

use super::db_error;
use crate::store::PageStore;

/// Repository for story pages.
#[derive(Debug, Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    /// Create a new page repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageStore for PageRepository {
    async fn create(&self, page: &Page) -> AppResult<Page> {
        sqlx::query_as::<_, Page>(
            "INSERT INTO pages (id, story_id, author_id, title, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(page.id)
        .bind(page.story_id)
        .bind(page.author_id)
        .bind(&page.title)
        .bind(page.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create page", e))
    }

    async fn find_by_story_and_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
    ) -> AppResult<Vec<Page>> {
        sqlx::query_as::<_, Page>(
            "SELECT * FROM pages WHERE story_id = $1 AND author_id = $2 ORDER BY created_at",
        )
        .bind(story_id)
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list pages", e))
    }

    async fn delete_many(&self, ids: &[PageId]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM pages WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete pages", e))?;
        Ok(result.rows_affected())
    }
}
