//! Page domain entities.

pub mod model;

pub use model::Page;
