//! Storage plan configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Plan allotments used by the quota ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Plan assumed for authors whose plan key is unknown.
    #[serde(default = "default_plan")]
    pub default_plan: String,
    /// Plan key to allotment in bytes.
    #[serde(default = "default_plans")]
    pub plans: HashMap<String, u64>,
}

impl QuotaConfig {
    /// Allotment for a plan key, falling back to the default plan.
    pub fn allotment(&self, plan: &str) -> u64 {
        self.plans
            .get(plan)
            .or_else(|| self.plans.get(&self.default_plan))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_plan: default_plan(),
            plans: default_plans(),
        }
    }
}

fn default_plan() -> String {
    "free".to_string()
}

fn default_plans() -> HashMap<String, u64> {
    HashMap::from([
        ("free".to_string(), 100 * MB),
        ("member".to_string(), 5 * MB),
        ("premium".to_string(), 10 * 1024 * MB),
    ])
}
