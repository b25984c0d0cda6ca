//! PostgreSQL implementations of the store contracts.

pub mod author;
pub mod collaboration_invite;
pub mod group;
pub mod group_invite;
pub mod page;
pub mod story;

pub use author::AuthorRepository;
pub use collaboration_invite::CollaborationInviteRepository;
pub use group::GroupRepository;
pub use group_invite::GroupInviteRepository;
pub use page::PageRepository;
pub use story::StoryRepository;

use storyhub_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique-constraint violations into `Conflict`.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, format!("{context}: already exists"), err)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}
