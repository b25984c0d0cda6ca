//! Collaboration and group policy configuration.

use serde::{Deserialize, Serialize};

/// Story collaboration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationConfig {
    /// Default page size for collaborator listings.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Maximum number of targets accepted by a single invite call.
    #[serde(default = "default_max_invite_targets")]
    pub max_invite_targets: usize,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_invite_targets: default_max_invite_targets(),
        }
    }
}

/// Account group settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Maximum members per group, counting outstanding invites.
    #[serde(default = "default_max_members")]
    pub max_members: usize,
    /// Number of random bytes in a group invite token.
    #[serde(default = "default_token_bytes")]
    pub invite_token_bytes: usize,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_members: default_max_members(),
            invite_token_bytes: default_token_bytes(),
        }
    }
}

fn default_page_size() -> u64 {
    25
}

fn default_max_invite_targets() -> usize {
    50
}

fn default_max_members() -> usize {
    5
}

fn default_token_bytes() -> usize {
    32
}
