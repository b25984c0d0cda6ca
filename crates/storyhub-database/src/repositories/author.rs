//! Author repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use storyhub_core::result::AppResult;
use storyhub_core::types::id::AuthorId;
use storyhub_entity::author::Author;

use super::db_error;
use crate::store::{AuthorStore, IdentityLookup, normalize_email};

const SELECT_AUTHOR: &str = "SELECT a.id, a.name, a.username, a.email, a.plan, a.used_bytes, \
     gm.group_id, a.created_at \
     FROM authors a LEFT JOIN group_members gm ON gm.author_id = a.id";

/// Repository for author accounts.
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: PgPool,
}

impl AuthorRepository {
    /// Create a new author repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Overwrite an author's usage counter.
    pub async fn set_used_bytes(&self, id: AuthorId, used_bytes: i64) -> AppResult<bool> {
        let result = sqlx::query("UPDATE authors SET used_bytes = $2 WHERE id = $1")
            .bind(id)
            .bind(used_bytes)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update author usage", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuthorStore for AuthorRepository {
    async fn find_by_id(&self, id: AuthorId) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(&format!("{SELECT_AUTHOR} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find author", e))
    }

    async fn find_many(&self, ids: &[AuthorId]) -> AppResult<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Author>(&format!("{SELECT_AUTHOR} WHERE a.id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to load authors", e))
    }

    async fn create(&self, author: &Author) -> AppResult<Author> {
        let email = normalize_email(&author.email);
        sqlx::query(
            "INSERT INTO authors (id, name, username, email, plan, used_bytes, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(author.id)
        .bind(&author.name)
        .bind(&author.username)
        .bind(&email)
        .bind(&author.plan)
        .bind(author.used_bytes)
        .bind(author.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create author", e))?;

        let mut created = author.clone();
        created.email = email;
        created.group_id = None;
        Ok(created)
    }
}

#[async_trait]
impl IdentityLookup for AuthorRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(&format!("{SELECT_AUTHOR} WHERE lower(a.email) = lower($1)"))
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find author by email", e))
    }
}
