//! View-model stores: in-memory snapshots of record-store state plus the
//! derived aggregates the presentation layer reads. Constructed once at
//! startup and injected through `AppState` — nothing here is a global —
//! with `reset()` as the teardown hook for tests.
//!
//! Every mutating method follows the same sequence: local write first
//! (errors propagate), then the best-effort mirror attempt whose `Err`
//! is logged and dropped, then a re-query of local aggregates and a
//! snapshot republish regardless of the mirror outcome.

mod entries;
mod plans;

pub use entries::{CategoryShare, EntrySnapshot, EntryStore, SummaryView};
pub use plans::{PlanProgress, PlanSnapshot, PlanStore};

/// Kilocalories burned per minute of logged activity — a deliberately
/// coarse linear estimate.
pub const CALORIES_PER_MINUTE: f64 = 7.0;
