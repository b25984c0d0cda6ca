//! Story collaboration registry: invitations, collaborator entries, and
//! the listings built from them.

pub mod batch;
pub mod listing;
pub mod service;
pub mod target;

pub use batch::{BatchFailure, BatchResult};
pub use listing::{CollaboratorRow, PendingInviteRow};
pub use service::{CancelOutcome, CollaborationService, InvitedCollaborator, LeaveOutcome};
pub use target::InviteTarget;
