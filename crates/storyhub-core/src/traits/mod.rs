//! Outbound seams defined in `storyhub-core` and implemented elsewhere.
//!
//! Persistence contracts live in `storyhub-database` next to their
//! implementations because they are expressed in entity types.

pub mod delivery;
pub mod notifier;

pub use delivery::{EmailMessage, EmailSender, PushMessage, PushSender};
pub use notifier::{ActivityNotifier, NoopNotifier};
