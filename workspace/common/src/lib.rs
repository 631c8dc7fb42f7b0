//! Shared transport and value types used across the fitlog workspace.
//! These structs mirror the shapes exchanged between the record store,
//! the sync layer and the HTTP handlers so no crate duplicates them.

mod coerce;
mod period;

pub use coerce::LooseNumber;
pub use period::{DateRange, Period};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-kind minute totals over a date range.
///
/// `income` carries body-area tag records, `expense` carries workout
/// records; the field names are the legacy wire vocabulary shared with
/// the remote mirror.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct ActivitySummary {
    /// Total minutes of body-area tag records.
    pub income: f64,
    /// Total minutes of workout records.
    pub expense: f64,
}

/// Minute total for a single category within one entry kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryTotal {
    pub category: String,
    pub category_icon: String,
    /// Summed minutes; query results come back largest first.
    pub total: f64,
    /// Number of entries contributing to the sum.
    pub count: i64,
}

/// Outcome counts of a bulk replay of local state to the remote mirror.
/// Failures are counted, never rolled back or retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct ReplayReport {
    pub plans_ok: u32,
    pub plans_failed: u32,
    pub entries_ok: u32,
    pub entries_failed: u32,
}

impl ReplayReport {
    pub fn merge(self, other: ReplayReport) -> ReplayReport {
        ReplayReport {
            plans_ok: self.plans_ok + other.plans_ok,
            plans_failed: self.plans_failed + other.plans_failed,
            entries_ok: self.entries_ok + other.entries_ok,
            entries_failed: self.entries_failed + other.entries_failed,
        }
    }
}
