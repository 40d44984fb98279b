//! # Pool Error Types

use thiserror::Error;

use crate::Handle;

/// Errors returned by slot pool operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot is live; fixed-capacity pools never grow.
    #[error("allocation failed: all {capacity} slots are in use")]
    AllocationFailed {
        /// Capacity of the exhausted pool.
        capacity: usize,
    },

    /// Handle is out of range, refers to a free slot, or carries a stale generation.
    #[error("invalid handle: index {index}, generation {generation}")]
    InvalidHandle {
        /// Index carried by the rejected handle.
        index: u32,
        /// Generation carried by the rejected handle.
        generation: u32,
    },
}

impl PoolError {
    /// Builds an `InvalidHandle` error for the given handle.
    #[inline]
    #[must_use]
    pub const fn invalid_handle<T>(handle: Handle<T>) -> Self {
        Self::InvalidHandle {
            index: handle.index(),
            generation: handle.generation(),
        }
    }
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
