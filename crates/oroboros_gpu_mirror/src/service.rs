//! GPU buffer service interface.
//!
//! The service owns device memory. Mirrors only address it by slot.

use crate::GpuResult;

/// Identifier of a buffer created by a [`GpuBufferService`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(u32);

impl BufferId {
    /// Wraps a service-assigned buffer number.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the service-assigned buffer number.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A host graphics layer that stores fixed-stride records in GPU-visible buffers.
///
/// Methods take `&self`: the update stage writes while the render stage may
/// hold the same service, so implementations synchronize internally.
/// Implementations must validate `index < capacity` and
/// `bytes.len() == stride` before touching memory, and must apply a write
/// entirely or not at all.
pub trait GpuBufferService: Send + Sync {
    /// Allocates a buffer of `capacity` records of `stride` bytes each.
    ///
    /// # Errors
    ///
    /// Returns `OutOfDeviceMemory` or `OutOfHostMemory` when the allocation
    /// cannot be backed.
    fn create_buffer(&self, label: &str, stride: usize, capacity: u32) -> GpuResult<BufferId>;

    /// Releases a buffer and the memory backing it.
    ///
    /// The id is never handed out again; later calls with it fail with
    /// `UnknownBuffer`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownBuffer` if the buffer does not exist or was already
    /// destroyed.
    fn destroy_buffer(&self, buffer: BufferId) -> GpuResult<()>;

    /// Overwrites the record at `index` with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfCapacity`, `StrideMismatch`, `UnknownBuffer`, or a
    /// device-level failure. Nothing is written on error.
    fn write(&self, buffer: BufferId, index: u32, bytes: &[u8]) -> GpuResult<()>;

    /// Copies the resident record at `index` into `out`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GpuBufferService::write`].
    fn read(&self, buffer: BufferId, index: u32, out: &mut [u8]) -> GpuResult<()>;
}
