//! Story repository implementation.
//!
//! Stories are stored flat; the collaborator set lives in
//! `story_collaborators` and is reassembled in insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, StoryId};
use storyhub_entity::story::{
    AddCollaboratorOutcome, Collaborator, Collaborators, ShareSettings, Story,
};

use super::db_error;
use crate::store::StoryStore;

#[derive(Debug, FromRow)]
struct StoryRow {
    id: StoryId,
    owner_id: AuthorId,
    title: String,
    share_followers: bool,
    share_link: bool,
    share_search: bool,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CollaboratorRow {
    author_id: AuthorId,
    edit: bool,
    added_at: DateTime<Utc>,
}

impl StoryRow {
    fn into_story(self, collaborators: Vec<CollaboratorRow>) -> Story {
        Story {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            share: ShareSettings {
                followers: self.share_followers,
                link: self.share_link,
                search: self.share_search,
            },
            collaborators: Collaborators::from(
                collaborators
                    .into_iter()
                    .map(|c| Collaborator {
                        author_id: c.author_id,
                        edit: c.edit,
                        added_at: c.added_at,
                    })
                    .collect::<Vec<_>>(),
            ),
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for stories and their collaborator sets.
#[derive(Debug, Clone)]
pub struct StoryRepository {
    pool: PgPool,
}

impl StoryRepository {
    /// Create a new story repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn touch(&self, story_id: StoryId) -> AppResult<()> {
        sqlx::query("UPDATE stories SET updated_at = NOW() WHERE id = $1")
            .bind(story_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to touch story", e))?;
        Ok(())
    }
}

#[async_trait]
impl StoryStore for StoryRepository {
    async fn find_by_id(&self, id: StoryId) -> AppResult<Option<Story>> {
        let Some(row) = sqlx::query_as::<_, StoryRow>("SELECT * FROM stories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find story", e))?
        else {
            return Ok(None);
        };

        let collaborators = sqlx::query_as::<_, CollaboratorRow>(
            "SELECT author_id, edit, added_at FROM story_collaborators \
             WHERE story_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load collaborators", e))?;

        Ok(Some(row.into_story(collaborators)))
    }

    async fn create(&self, story: &Story) -> AppResult<Story> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        sqlx::query(
            "INSERT INTO stories (id, owner_id, title, share_followers, share_link, share_search, \
             deleted_at, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(story.id)
        .bind(story.owner_id)
        .bind(&story.title)
        .bind(story.share.followers)
        .bind(story.share.link)
        .bind(story.share.search)
        .bind(story.deleted_at)
        .bind(story.created_at)
        .bind(story.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to create story", e))?;

        for collaborator in story.collaborators.iter() {
            sqlx::query(
                "INSERT INTO story_collaborators (story_id, author_id, edit, added_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(story.id)
            .bind(collaborator.author_id)
            .bind(collaborator.edit)
            .bind(collaborator.added_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to store collaborator", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit story", e))?;
        Ok(story.clone())
    }

    async fn add_collaborator(
        &self,
        story_id: StoryId,
        collaborator: Collaborator,
    ) -> AppResult<AddCollaboratorOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO story_collaborators (story_id, author_id, edit, added_at) \
             SELECT s.id, $2, $3, $4 FROM stories s \
             WHERE s.id = $1 AND s.owner_id <> $2 AND s.deleted_at IS NULL \
             ON CONFLICT (story_id, author_id) DO NOTHING",
        )
        .bind(story_id)
        .bind(collaborator.author_id)
        .bind(collaborator.edit)
        .bind(collaborator.added_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add collaborator", e))?
        .rows_affected();

        if inserted > 0 {
            self.touch(story_id).await?;
            return Ok(AddCollaboratorOutcome::Inserted);
        }

        let owner: Option<(AuthorId, Option<DateTime<Utc>>)> =
            sqlx::query_as("SELECT owner_id, deleted_at FROM stories WHERE id = $1")
                .bind(story_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load story", e))?;

        Ok(match owner {
            None | Some((_, Some(_))) => AddCollaboratorOutcome::StoryMissing,
            Some((owner_id, None)) if owner_id == collaborator.author_id => {
                AddCollaboratorOutcome::OwnerRejected
            }
            Some(_) => AddCollaboratorOutcome::AlreadyPresent,
        })
    }

    async fn set_collaborator_edit(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<bool> {
        let updated = sqlx::query(
            "UPDATE story_collaborators SET edit = $3 WHERE story_id = $1 AND author_id = $2",
        )
        .bind(story_id)
        .bind(author_id)
        .bind(edit)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update collaborator", e))?
        .rows_affected();

        if updated > 0 {
            self.touch(story_id).await?;
        }
        Ok(updated > 0)
    }

    async fn remove_collaborators(
        &self,
        story_id: StoryId,
        author_ids: &[AuthorId],
    ) -> AppResult<Vec<AuthorId>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }
        let removed: Vec<AuthorId> = sqlx::query_scalar(
            "DELETE FROM story_collaborators WHERE story_id = $1 AND author_id = ANY($2) \
             RETURNING author_id",
        )
        .bind(story_id)
        .bind(author_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to remove collaborators", e))?;

        if !removed.is_empty() {
            self.touch(story_id).await?;
        }
        Ok(removed)
    }

    async fn soft_delete(&self, story_id: StoryId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE stories SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(story_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete story", e))?;
        Ok(result.rows_affected() > 0)
    }
}
