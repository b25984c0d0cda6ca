//! # storyhub-core
//!
//! Core crate for StoryHub. Contains the outbound-interface traits
//! (activity notifier, delivery senders), configuration schemas, typed
//! identifiers, activity events, pagination types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other StoryHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
