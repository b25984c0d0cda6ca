//! Storage quota accounting for authors and groups.

pub mod ledger;
pub mod service;

pub use ledger::QuotaLedger;
pub use service::{QuotaReport, QuotaService};
