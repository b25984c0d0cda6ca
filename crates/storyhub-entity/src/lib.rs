//! # storyhub-entity
//!
//! Domain entity models for StoryHub. Flat entities that map one-to-one to
//! a table row additionally derive `sqlx::FromRow`; aggregates with embedded
//! collections (stories, groups) are assembled by the repositories.

pub mod author;
pub mod collaboration;
pub mod group;
pub mod page;
pub mod quota;
pub mod story;
