//! # Recalculation Error Types
//!
//! Batch-fatal conditions only. A per-record failure inside a batch is
//! counted in the returned outcome and logged; it never raises one of
//! these.

use thiserror::Error;

use marlin_core::ValidationError;
use marlin_db::DbError;

/// Errors that abort a recalculation batch before or while it runs.
#[derive(Debug, Error)]
pub enum RecalcError {
    /// The trigger input was rejected before the batch started.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The dependent set could not be listed, or another batch-fatal
    /// database failure.
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Result type for recalculation operations.
pub type RecalcResult<T> = Result<T, RecalcError>;
