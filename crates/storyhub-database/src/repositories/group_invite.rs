//! Group invite repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, GroupId, GroupInviteId};
use storyhub_entity::group::GroupInvite;

use super::db_error;
use crate::store::GroupInviteStore;

/// Repository for group invites and token lookup.
#[derive(Debug, Clone)]
pub struct GroupInviteRepository {
    pool: PgPool,
}

impl GroupInviteRepository {
    /// Create a new group invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupInviteStore for GroupInviteRepository {
    async fn insert_active(&self, invite: &GroupInvite) -> AppResult<GroupInvite> {
        sqlx::query_as::<_, GroupInvite>(
            "INSERT INTO group_invites \
             (id, group_id, author_id, invited, email, token, active, accepted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, lower($5), $6, TRUE, NULL, $7, $8) RETURNING *",
        )
        .bind(invite.id)
        .bind(invite.group_id)
        .bind(invite.author_id)
        .bind(invite.invited)
        .bind(invite.email.trim())
        .bind(&invite.token)
        .bind(invite.created_at)
        .bind(invite.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create group invite", e))
    }

    async fn find_by_id(&self, id: GroupInviteId) -> AppResult<Option<GroupInvite>> {
        sqlx::query_as::<_, GroupInvite>("SELECT * FROM group_invites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find group invite", e))
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<GroupInvite>> {
        sqlx::query_as::<_, GroupInvite>("SELECT * FROM group_invites WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find group invite by token", e))
    }

    async fn find_active_by_group(&self, group_id: GroupId) -> AppResult<Vec<GroupInvite>> {
        sqlx::query_as::<_, GroupInvite>(
            "SELECT * FROM group_invites WHERE group_id = $1 AND active ORDER BY created_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list group invites", e))
    }

    async fn resolve(
        &self,
        id: GroupInviteId,
        accepted: bool,
        invited: AuthorId,
    ) -> AppResult<Option<GroupInvite>> {
        sqlx::query_as::<_, GroupInvite>(
            "UPDATE group_invites SET active = FALSE, accepted = $2, invited = $3, \
             updated_at = NOW() WHERE id = $1 AND active RETURNING *",
        )
        .bind(id)
        .bind(accepted)
        .bind(invited)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to answer group invite", e))
    }

    async fn deactivate(&self, id: GroupInviteId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE group_invites SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to cancel group invite", e))?;
        Ok(result.rows_affected() > 0)
    }
}
