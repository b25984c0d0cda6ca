//! Collaboration invite entities.

pub mod invite;

pub use invite::{CollaborationInvite, InviteStatus};
