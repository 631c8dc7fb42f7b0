//! Record store: sole owner of plan/entry persistence and the aggregate
//! queries over them. Everything else in the workspace treats the local
//! database as the source of truth and goes through this crate; the
//! remote mirror is a one-way replication sink layered on top, never an
//! alternate backend.

pub mod entries;
pub mod error;
pub mod plans;

pub use entries::{EntryPatch, EntryWithPlan, NewEntry};
pub use error::{Result, StoreError};
pub use plans::{NewPlan, PlanPatch};

#[cfg(test)]
mod tests;
