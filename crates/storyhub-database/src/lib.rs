//! # storyhub-database
//!
//! Persistence contracts consumed by the StoryHub registries, with two
//! implementations: PostgreSQL repositories (sqlx) and a process-local
//! store backed by `dashmap`. Both enforce the collaborator, invite, and
//! membership uniqueness rules at the mutation boundary.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    AuthorStore, CollaborationInviteStore, GroupInviteStore, GroupStore, IdentityLookup,
    PageStore, StoryStore, Stores,
};
