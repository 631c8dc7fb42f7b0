pub mod entry;
pub mod plan;
