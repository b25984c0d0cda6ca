//! Activity notifier trait.

use tracing::trace;

use crate::events::ActivityEvent;

/// Receives lifecycle events from the registries.
///
/// Implementations must return immediately: the registries call `emit`
/// after a mutation has been applied and never observe delivery. Losing an
/// event is acceptable; rolling back a permission change is not.
pub trait ActivityNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Hand an event over for asynchronous delivery.
    fn emit(&self, event: ActivityEvent);
}

/// Notifier that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ActivityNotifier for NoopNotifier {
    fn emit(&self, event: ActivityEvent) {
        trace!(event_id = %event.id, kind = %event.kind(), "Activity event discarded");
    }
}
