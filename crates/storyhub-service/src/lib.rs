//! # storyhub-service
//!
//! The collaboration and permission engine. Each service owns one registry
//! of the domain and orchestrates the store contracts from
//! `storyhub-database`, consulting [`PermissionResolver`] before every
//! mutation and handing lifecycle events to an
//! [`ActivityNotifier`](storyhub_core::traits::ActivityNotifier).
//!
//! Services follow constructor injection: every dependency is provided at
//! construction time via `Arc` references.

pub mod collaboration;
pub mod context;
pub mod group;
pub mod permission;
pub mod quota;

pub use collaboration::{BatchFailure, BatchResult, CollaborationService, InviteTarget};
pub use context::RequestContext;
pub use group::GroupService;
pub use permission::{Audience, Capabilities, PermissionResolver, PermissionService};
pub use quota::{QuotaLedger, QuotaReport, QuotaService};
