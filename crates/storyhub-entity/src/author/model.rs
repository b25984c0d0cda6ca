//! Author entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use storyhub_core::types::id::{AuthorId, GroupId};

/// A registered author account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    /// Unique author identifier.
    pub id: AuthorId,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Email address, stored lowercase.
    pub email: String,
    /// Storage plan key.
    pub plan: String,
    /// Bytes consumed by this author's content. Maintained by content code.
    pub used_bytes: i64,
    /// Group this author belongs to as a member, if any.
    #[sqlx(default)]
    pub group_id: Option<GroupId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Author {
    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Case-insensitive substring match over name, username, and email.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.username.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }

    /// Usage as an unsigned byte count; negative counters read as zero.
    pub fn used_bytes(&self) -> u64 {
        u64::try_from(self.used_bytes).unwrap_or(0)
    }
}

/// Data required to register a new author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthor {
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Storage plan key.
    pub plan: String,
}

impl CreateAuthor {
    /// Build the entity with a fresh id and zero usage.
    pub fn into_author(self) -> Author {
        Author {
            id: AuthorId::new(),
            name: self.name,
            username: self.username,
            email: self.email.trim().to_lowercase(),
            plan: self.plan,
            used_bytes: 0,
            group_id: None,
            created_at: Utc::now(),
        }
    }
}
