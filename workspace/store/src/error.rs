use thiserror::Error;

/// Error type for record-store operations.
///
/// Mutating operations propagate these to the caller; aggregate reads are
/// degraded to zero-valued defaults by the view-model layer instead.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error from the underlying database.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A row addressed by id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Type alias for Result with StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;
