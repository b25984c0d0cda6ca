//! Pure quota aggregation over externally maintained usage counters.

use std::collections::HashMap;

use storyhub_core::types::id::AuthorId;
use storyhub_entity::quota::{AuthorQuota, GroupQuota, QuotaValue};

/// Computes quota reports. Never fails: absent data counts as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotaLedger;

impl QuotaLedger {
    /// Quota of a single author on a plan allotment.
    pub fn compute_author_quota(&self, allotment: u64, used: u64) -> AuthorQuota {
        AuthorQuota {
            total: QuotaValue::new(allotment),
            used: QuotaValue::new(used),
            left: QuotaValue::new(allotment.saturating_sub(used)),
        }
    }

    /// Pooled quota of a group as seen by `viewer`.
    ///
    /// `allotments` holds one entry per group author, owner included.
    /// `usage` maps each author to their consumed bytes; authors missing
    /// from it count as zero.
    pub fn compute_group_quota(
        &self,
        allotments: &[u64],
        usage: &HashMap<AuthorId, u64>,
        viewer: AuthorId,
    ) -> GroupQuota {
        let total = allotments
            .iter()
            .fold(0u64, |acc, bytes| acc.saturating_add(*bytes));
        let you = usage.get(&viewer).copied().unwrap_or(0);
        let others = usage
            .iter()
            .filter(|(author, _)| **author != viewer)
            .fold(0u64, |acc, (_, bytes)| acc.saturating_add(*bytes));
        let left = total.saturating_sub(you.saturating_add(others));

        GroupQuota {
            you: QuotaValue::new(you),
            others: QuotaValue::new(others),
            left: QuotaValue::new(left),
            total: QuotaValue::new(total),
        }
    }
}
