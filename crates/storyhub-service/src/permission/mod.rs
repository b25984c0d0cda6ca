//! Capability resolution for stories.

pub mod resolver;
pub mod service;

pub use resolver::{Audience, Capabilities, CapabilitySource, PermissionResolver};
pub use service::PermissionService;
