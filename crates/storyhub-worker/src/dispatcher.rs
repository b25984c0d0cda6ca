//! Activity dispatcher: drains the queue and delivers notifications.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use storyhub_core::events::ActivityEvent;
use storyhub_core::traits::{EmailSender, PushSender};

use crate::rules::ActivityRules;

/// Counters reported when the dispatcher stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Events taken off the queue.
    pub events: u64,
    /// Messages handed to a sender successfully.
    pub delivered: u64,
    /// Messages a sender rejected, plus events whose recipients could not
    /// be resolved.
    pub failed: u64,
}

/// Consumes activity events and fans them out to email and push.
///
/// Failures are logged and counted, never returned: nothing upstream waits
/// on delivery.
#[derive(Debug, Clone)]
pub struct ActivityDispatcher {
    /// Recipient rules.
    rules: ActivityRules,
    /// Email channel.
    email: Arc<dyn EmailSender>,
    /// Push channel.
    push: Arc<dyn PushSender>,
}

impl ActivityDispatcher {
    /// Creates a dispatcher.
    pub fn new(rules: ActivityRules, email: Arc<dyn EmailSender>, push: Arc<dyn PushSender>) -> Self {
        Self { rules, email, push }
    }

    /// Run until the queue closes or `shutdown` flips to `true`.
    ///
    /// On shutdown, events already queued are still delivered.
    pub async fn run(
        &self,
        mut queue: mpsc::Receiver<ActivityEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> DispatchStats {
        info!("Activity dispatcher started");
        let mut stats = DispatchStats::default();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Activity dispatcher received shutdown signal");
                        break;
                    }
                }
                next = queue.recv() => match next {
                    Some(event) => self.handle(&event, &mut stats).await,
                    None => {
                        debug!("Activity queue closed");
                        break;
                    }
                }
            }
        }

        queue.close();
        while let Some(event) = queue.recv().await {
            self.handle(&event, &mut stats).await;
        }

        info!(
            events = stats.events,
            delivered = stats.delivered,
            failed = stats.failed,
            "Activity dispatcher stopped"
        );
        stats
    }

    /// Deliver one event.
    pub async fn handle(&self, event: &ActivityEvent, stats: &mut DispatchStats) {
        stats.events += 1;

        let deliveries = match self.rules.deliveries(event).await {
            Ok(deliveries) => deliveries,
            Err(e) => {
                error!(event_id = %event.id, kind = %event.kind(), error = %e, "Failed to resolve recipients");
                stats.failed += 1;
                return;
            }
        };
        if deliveries.is_empty() {
            debug!(event_id = %event.id, kind = %event.kind(), "No recipients for event");
            return;
        }

        for message in deliveries.emails {
            let to = message.to.clone();
            match self.email.send(message).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    warn!(event_id = %event.id, to = %to, error = %e, "Email delivery failed");
                    stats.failed += 1;
                }
            }
        }

        for message in deliveries.pushes {
            let recipient = message.recipient;
            match self.push.send(message).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    warn!(event_id = %event.id, recipient = %recipient, error = %e, "Push delivery failed");
                    stats.failed += 1;
                }
            }
        }
    }
}
