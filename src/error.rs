//! Cache error types

use thiserror::Error;

/// Errors raised by cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A non-positive budget was passed to a constructor or `resize`.
    #[error("max weight must be positive, got {max_weight}")]
    InvalidArgument { max_weight: i64 },

    /// The weigher returned a negative weight.
    #[error("negative weight {weight} for entry {entry}")]
    InvalidWeight { entry: String, weight: i64 },

    /// Adding an entry would push the total weight past `i64::MAX`.
    #[error("total weight {total_weight} cannot grow by {weight} without overflowing")]
    WeightOverflow { total_weight: i64, weight: i64 },

    /// Total weight no longer matches the entries held.
    ///
    /// This only happens when the weigher is not deterministic for a given
    /// key/value pair.
    #[error("inconsistent cache size: total weight {total_weight} with {entries} entries")]
    InconsistentSize { total_weight: i64, entries: usize },
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Validates a budget supplied by the caller.
pub(crate) fn check_max_weight(max_weight: i64) -> CacheResult<i64> {
    if max_weight <= 0 {
        return Err(CacheError::InvalidArgument { max_weight });
    }
    Ok(max_weight)
}
