//! Activity notification delivery for StoryHub.
//!
//! This crate provides:
//! - A bounded queue implementing `ActivityNotifier` that never blocks
//! - Rules turning activity events into email and push deliveries
//! - A dispatcher loop that drains the queue until shutdown
//! - Logging delivery channels

pub mod dispatcher;
pub mod notifier;
pub mod rules;
pub mod senders;

pub use dispatcher::{ActivityDispatcher, DispatchStats};
pub use notifier::ChannelNotifier;
pub use rules::{ActivityRules, Deliveries};
pub use senders::{LoggingEmailSender, LoggingPushSender};
