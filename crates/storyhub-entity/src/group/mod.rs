//! Account group entities.

pub mod invite;
pub mod model;

pub use invite::GroupInvite;
pub use model::{AddMemberOutcome, Group, GroupMember};
