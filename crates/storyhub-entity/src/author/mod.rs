//! Author domain entities.

pub mod model;

pub use model::{Author, CreateAuthor};
