//! Quota value objects.

pub mod model;
pub mod value;

pub use model::{AuthorQuota, GroupQuota, Plan};
pub use value::{QuotaValue, format_bytes};
