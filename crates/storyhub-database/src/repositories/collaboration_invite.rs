//! Collaboration invite repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, CollaborationInviteId, StoryId};
use storyhub_entity::collaboration::CollaborationInvite;

use super::db_error;
use crate::store::CollaborationInviteStore;

/// Repository for story collaboration invites.
///
/// The partial unique index `collaboration_invites_active_key` backs the
/// one-active-invite-per-email rule.
#[derive(Debug, Clone)]
pub struct CollaborationInviteRepository {
    pool: PgPool,
}

impl CollaborationInviteRepository {
    /// Create a new collaboration invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollaborationInviteStore for CollaborationInviteRepository {
    async fn insert_active(&self, invite: &CollaborationInvite) -> AppResult<CollaborationInvite> {
        sqlx::query_as::<_, CollaborationInvite>(
            "INSERT INTO collaboration_invites \
             (id, story_id, author_id, invited, email, edit, active, accepted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, lower($5), $6, TRUE, NULL, $7, $8) RETURNING *",
        )
        .bind(invite.id)
        .bind(invite.story_id)
        .bind(invite.author_id)
        .bind(invite.invited)
        .bind(invite.email.trim())
        .bind(invite.edit)
        .bind(invite.created_at)
        .bind(invite.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create collaboration invite", e))
    }

    async fn find_by_id(
        &self,
        id: CollaborationInviteId,
    ) -> AppResult<Option<CollaborationInvite>> {
        sqlx::query_as::<_, CollaborationInvite>("SELECT * FROM collaboration_invites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find collaboration invite", e))
    }

    async fn find_active_by_story(&self, story_id: StoryId) -> AppResult<Vec<CollaborationInvite>> {
        sqlx::query_as::<_, CollaborationInvite>(
            "SELECT * FROM collaboration_invites WHERE story_id = $1 AND active \
             ORDER BY created_at",
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list collaboration invites", e))
    }

    async fn find_active_by_email(&self, email: &str) -> AppResult<Vec<CollaborationInvite>> {
        sqlx::query_as::<_, CollaborationInvite>(
            "SELECT * FROM collaboration_invites WHERE lower(email) = lower($1) AND active \
             ORDER BY created_at",
        )
        .bind(email.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list invites by email", e))
    }

    async fn deactivate(&self, id: CollaborationInviteId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE collaboration_invites SET active = FALSE, updated_at = NOW() \
             WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to deactivate invite", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_by_emails(
        &self,
        story_id: StoryId,
        emails: &[String],
    ) -> AppResult<Vec<CollaborationInvite>> {
        let emails: Vec<String> = emails.iter().map(|e| e.trim().to_lowercase()).collect();
        sqlx::query_as::<_, CollaborationInvite>(
            "UPDATE collaboration_invites SET active = FALSE, updated_at = NOW() \
             WHERE story_id = $1 AND active AND lower(email) = ANY($2) RETURNING *",
        )
        .bind(story_id)
        .bind(&emails)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to cancel invites", e))
    }

    async fn deactivate_for_author(&self, story_id: StoryId, author_id: AuthorId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE collaboration_invites SET active = FALSE, updated_at = NOW() \
             WHERE story_id = $1 AND invited = $2 AND active",
        )
        .bind(story_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to close author invites", e))?;
        Ok(result.rows_affected())
    }

    async fn resolve(
        &self,
        id: CollaborationInviteId,
        accepted: bool,
    ) -> AppResult<Option<CollaborationInvite>> {
        sqlx::query_as::<_, CollaborationInvite>(
            "UPDATE collaboration_invites SET active = FALSE, accepted = $2, updated_at = NOW() \
             WHERE id = $1 AND active RETURNING *",
        )
        .bind(id)
        .bind(accepted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to answer invite", e))
    }

    async fn attach_invited(
        &self,
        id: CollaborationInviteId,
        author_id: AuthorId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE collaboration_invites SET invited = $2, updated_at = NOW() \
             WHERE id = $1 AND active AND invited IS NULL",
        )
        .bind(id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to attach invitee", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_edit_for_author(
        &self,
        story_id: StoryId,
        author_id: AuthorId,
        edit: bool,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE collaboration_invites SET edit = $3, updated_at = NOW() \
             WHERE story_id = $1 AND invited = $2 AND active",
        )
        .bind(story_id)
        .bind(author_id)
        .bind(edit)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update invite permission", e))?;
        Ok(result.rows_affected())
    }
}
