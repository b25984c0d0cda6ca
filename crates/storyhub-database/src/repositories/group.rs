//! Group repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, GroupId};
use storyhub_entity::group::{AddMemberOutcome, Group, GroupMember};

use super::db_error;
use crate::store::GroupStore;

#[derive(Debug, FromRow)]
struct GroupRow {
    id: GroupId,
    owner_id: AuthorId,
    created_at: DateTime<Utc>,
}

/// Repository for groups and memberships.
///
/// `group_members.author_id` is unique, so an author can only ever hold one
/// membership row.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Create a new group repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn assemble(&self, row: Option<GroupRow>) -> AppResult<Option<Group>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let members = sqlx::query_as::<_, GroupMember>(
            "SELECT author_id, joined_at FROM group_members WHERE group_id = $1 ORDER BY joined_at",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load group members", e))?;

        Ok(Some(Group {
            id: row.id,
            owner_id: row.owner_id,
            members,
            created_at: row.created_at,
        }))
    }

    async fn fetch_row(&self, sql: &str, id: uuid::Uuid) -> AppResult<Option<GroupRow>> {
        sqlx::query_as::<_, GroupRow>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find group", e))
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn find_by_id(&self, id: GroupId) -> AppResult<Option<Group>> {
        let row = self
            .fetch_row("SELECT id, owner_id, created_at FROM groups WHERE id = $1", id.into_uuid())
            .await?;
        self.assemble(row).await
    }

    async fn find_by_owner(&self, owner_id: AuthorId) -> AppResult<Option<Group>> {
        let row = self
            .fetch_row(
                "SELECT id, owner_id, created_at FROM groups WHERE owner_id = $1",
                owner_id.into_uuid(),
            )
            .await?;
        self.assemble(row).await
    }

    async fn find_by_member(&self, author_id: AuthorId) -> AppResult<Option<Group>> {
        let row = self
            .fetch_row(
                "SELECT g.id, g.owner_id, g.created_at FROM groups g \
                 JOIN group_members gm ON gm.group_id = g.id WHERE gm.author_id = $1",
                author_id.into_uuid(),
            )
            .await?;
        self.assemble(row).await
    }

    async fn create(&self, group: &Group) -> AppResult<Group> {
        sqlx::query("INSERT INTO groups (id, owner_id, created_at) VALUES ($1, $2, $3)")
            .bind(group.id)
            .bind(group.owner_id)
            .bind(group.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to create group", e))?;
        Ok(Group {
            members: Vec::new(),
            ..group.clone()
        })
    }

    async fn add_member(
        &self,
        group_id: GroupId,
        author_id: AuthorId,
    ) -> AppResult<AddMemberOutcome> {
        let inserted = sqlx::query(
            "INSERT INTO group_members (group_id, author_id, joined_at) \
             SELECT g.id, $2, NOW() FROM groups g WHERE g.id = $1 AND g.owner_id <> $2 \
             AND NOT EXISTS (SELECT 1 FROM groups o WHERE o.owner_id = $2) \
             ON CONFLICT (author_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to add group member", e))?
        .rows_affected();

        if inserted > 0 {
            return Ok(AddMemberOutcome::Added);
        }

        let owner: Option<AuthorId> = sqlx::query_scalar("SELECT owner_id FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load group", e))?;
        let Some(owner) = owner else {
            return Ok(AddMemberOutcome::GroupMissing);
        };
        if owner == author_id {
            return Ok(AddMemberOutcome::IsOwner);
        }

        let owns: Option<GroupId> = sqlx::query_scalar("SELECT id FROM groups WHERE owner_id = $1")
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load owned group", e))?;
        if owns.is_some() {
            return Ok(AddMemberOutcome::OwnsGroup);
        }

        let current: Option<GroupId> =
            sqlx::query_scalar("SELECT group_id FROM group_members WHERE author_id = $1")
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to load membership", e))?;
        Ok(match current {
            Some(id) if id == group_id => AddMemberOutcome::AlreadyMember,
            _ => AddMemberOutcome::MemberElsewhere,
        })
    }

    async fn remove_member(&self, group_id: GroupId, author_id: AuthorId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND author_id = $2")
                .bind(group_id)
                .bind(author_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("Failed to remove group member", e))?;
        Ok(result.rows_affected() > 0)
    }
}
