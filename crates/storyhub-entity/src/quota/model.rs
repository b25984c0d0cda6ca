//! Quota reports.

use serde::{Deserialize, Serialize};

use super::value::QuotaValue;

/// A storage plan and its allotment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan key.
    pub key: String,
    /// Storage allotment in bytes.
    pub allotment_bytes: u64,
}

/// Quota of an author who is not part of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorQuota {
    /// Plan allotment.
    pub total: QuotaValue,
    /// Bytes consumed.
    pub used: QuotaValue,
    /// Remaining bytes, never negative.
    pub left: QuotaValue,
}

/// Pooled quota of a group, seen from one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupQuota {
    /// The requesting member's own usage.
    pub you: QuotaValue,
    /// Combined usage of every other member, owner included.
    pub others: QuotaValue,
    /// Remaining pooled bytes, never negative.
    pub left: QuotaValue,
    /// Sum of every member's plan allotment, owner included.
    pub total: QuotaValue,
}
