//! # Resource Error Types
//!
//! All errors that can occur in the resource layer. Pool and GPU failures
//! are wrapped unchanged so callers can match on the original kind.

use oroboros_gpu_mirror::GpuError;
use oroboros_pool::PoolError;
use thiserror::Error;

/// Failure reported by an animation-authoring collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct AuthoringError(pub String);

/// Errors that can occur in the resource layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// Slot pool failure: exhausted pool or invalid handle.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// GPU buffer failure, passed through from the buffer service.
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// The animation-authoring collaborator could not build a clip.
    #[error("animation authoring failed: {0}")]
    Authoring(#[from] AuthoringError),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),
}

impl ResourceError {
    /// True for stale, freed, or out-of-range handles.
    #[inline]
    #[must_use]
    pub const fn is_invalid_handle(&self) -> bool {
        matches!(self, Self::Pool(PoolError::InvalidHandle { .. }))
    }

    /// True when a pool or GPU buffer ran out of slots.
    #[inline]
    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::Pool(PoolError::AllocationFailed { .. }) | Self::Gpu(GpuError::OutOfCapacity { .. })
        )
    }
}

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
