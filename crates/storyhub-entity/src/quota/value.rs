//! Byte amounts paired with their human-readable form.

use serde::{Deserialize, Serialize};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// A byte count and its formatted rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaValue {
    /// Raw byte count.
    pub bytes: u64,
    /// Human-readable form, e.g. `"5.52 MB"`.
    pub formatted: String,
}

impl QuotaValue {
    /// Wrap a byte count.
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes,
            formatted: format_bytes(bytes),
        }
    }
}

impl From<u64> for QuotaValue {
    fn from(bytes: u64) -> Self {
        Self::new(bytes)
    }
}

/// Format bytes with binary prefixes, up to two decimals, trailing zeros trimmed.
///
/// Values below one kilobyte are printed as whole bytes; anything above a
/// gigabyte stays in GB.
pub fn format_bytes(bytes: u64) -> String {
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        return format!("{bytes} B");
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
