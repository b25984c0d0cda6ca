//! Quota lookups for authors, group-aware.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use storyhub_core::config::QuotaConfig;
use storyhub_core::error::AppError;
use storyhub_core::result::AppResult;
use storyhub_core::types::id::{AuthorId, GroupId};
use storyhub_database::store::{AuthorStore, GroupStore, Stores};
use storyhub_entity::quota::{AuthorQuota, GroupQuota, Plan};

use super::ledger::QuotaLedger;

/// Quota as seen by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum QuotaReport {
    /// The author is not part of a group.
    Author {
        /// Plan the allotment came from.
        plan: Plan,
        /// The figures.
        quota: AuthorQuota,
    },
    /// The author owns or belongs to a group and shares its pool.
    Group {
        /// The pooled group.
        group_id: GroupId,
        /// The figures.
        quota: GroupQuota,
    },
}

/// Reads usage counters and plan allotments and feeds them to the ledger.
#[derive(Debug, Clone)]
pub struct QuotaService {
    /// Author store.
    authors: Arc<dyn AuthorStore>,
    /// Group store.
    groups: Arc<dyn GroupStore>,
    /// Plan allotments.
    plans: QuotaConfig,
    /// Aggregation rules.
    ledger: QuotaLedger,
}

impl QuotaService {
    /// Creates a new quota service.
    pub fn new(stores: &Stores, plans: QuotaConfig) -> Self {
        Self {
            authors: Arc::clone(&stores.authors),
            groups: Arc::clone(&stores.groups),
            plans,
            ledger: QuotaLedger,
        }
    }

    /// Group quota when the author owns or belongs to a group, individual
    /// quota otherwise.
    pub async fn compute_quota(&self, author_id: AuthorId) -> AppResult<QuotaReport> {
        let author = self
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found"))?;

        let group = match self.groups.find_by_owner(author_id).await? {
            Some(group) => Some(group),
            None => self.groups.find_by_member(author_id).await?,
        };

        let Some(group) = group else {
            let plan = self.plan(&author.plan);
            let quota = self
                .ledger
                .compute_author_quota(plan.allotment_bytes, author.used_bytes());
            return Ok(QuotaReport::Author { plan, quota });
        };

        let authors = self.authors.find_many(&group.all_authors()).await?;
        let allotments: Vec<u64> = authors
            .iter()
            .map(|a| self.plans.allotment(&a.plan))
            .collect();
        let usage: HashMap<AuthorId, u64> = authors.iter().map(|a| (a.id, a.used_bytes())).collect();

        debug!(
            group_id = %group.id,
            authors = authors.len(),
            "Computing pooled group quota"
        );
        Ok(QuotaReport::Group {
            group_id: group.id,
            quota: self
                .ledger
                .compute_group_quota(&allotments, &usage, author_id),
        })
    }

    fn plan(&self, key: &str) -> Plan {
        let key = if self.plans.plans.contains_key(key) {
            key.to_string()
        } else {
            self.plans.default_plan.clone()
        };
        Plan {
            allotment_bytes: self.plans.allotment(&key),
            key,
        }
    }
}
