//! Activity notification configuration.

use serde::{Deserialize, Serialize};

/// Settings for the outbound activity queue and its delivery worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Capacity of the bounded activity queue. Events beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Whether email deliveries are produced.
    #[serde(default = "default_true")]
    pub email_enabled: bool,
    /// Whether push deliveries are produced.
    #[serde(default = "default_true")]
    pub push_enabled: bool,
    /// Sender address used for outgoing email.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            email_enabled: true,
            push_enabled: true,
            from_address: default_from_address(),
        }
    }
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

fn default_from_address() -> String {
    "no-reply@storyhub.local".to_string()
}
