//! # GPU Buffer Error Types
//!
//! The closed set of failures a buffer service may report. Callers receive
//! these unchanged.

use thiserror::Error;

use crate::BufferId;

/// Errors reported by GPU buffer services and mirrors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuError {
    /// Slot index is past the buffer's fixed capacity.
    #[error("index {index} is out of capacity {capacity}")]
    OutOfCapacity {
        /// Requested slot index.
        index: u32,
        /// Fixed capacity of the buffer.
        capacity: u32,
    },

    /// The device could not back the allocation.
    #[error("out of device memory")]
    OutOfDeviceMemory,

    /// Host-visible staging memory is exhausted.
    #[error("out of host memory")]
    OutOfHostMemory,

    /// The device was lost; every buffer on it is gone.
    #[error("device lost")]
    DeviceLost,

    /// The service does not know this buffer.
    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    /// Byte length does not match the buffer's record stride.
    #[error("stride mismatch: buffer stride is {expected} bytes, got {actual}")]
    StrideMismatch {
        /// Stride the buffer was created with.
        expected: usize,
        /// Length of the bytes supplied.
        actual: usize,
    },
}

/// Result type for GPU buffer operations.
pub type GpuResult<T> = Result<T, GpuError>;
