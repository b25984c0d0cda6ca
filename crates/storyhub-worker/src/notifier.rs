//! Bounded, non-blocking activity queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

use storyhub_core::events::ActivityEvent;
use storyhub_core::traits::ActivityNotifier;

/// Writes activity events into a bounded channel drained by
/// [`ActivityDispatcher`](crate::dispatcher::ActivityDispatcher).
///
/// `emit` never waits: when the queue is full or the worker is gone the
/// event is dropped and counted.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<ActivityEvent>,
    dropped: Arc<AtomicU64>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ActivityEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ActivityNotifier for ChannelNotifier {
    fn emit(&self, event: ActivityEvent) {
        let kind = event.kind();
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(event_id = %event.id, kind = %kind, dropped, "Activity queue full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(event_id = %event.id, kind = %kind, dropped, "Activity worker stopped, event dropped");
            }
        }
    }
}
