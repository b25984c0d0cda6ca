//! Account group registry: membership, invitations, and leave/remove.

pub mod service;
pub mod token;

pub use service::{GroupAcceptOutcome, GroupInviteOutcome, GroupMemberRow, GroupRole, GroupService};
pub use token::generate_token;
