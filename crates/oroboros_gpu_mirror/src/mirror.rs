//! GPU mirror buffers.
//!
//! A mirror pairs a record type with one service buffer. Slot `i` of the
//! buffer mirrors slot `i` of a resource pool.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use bytemuck::Pod;

use crate::{BufferId, GpuBufferService, GpuError, GpuResult};

/// A fixed-layout value type stored one-per-slot in a GPU buffer.
///
/// Implementors are `#[repr(C)]` and `Pod`; their byte layout is the shader
/// contract, explicit padding included.
pub trait GpuRecord: Pod + fmt::Debug {
    /// Buffer label used when the mirror creates its backing buffer.
    const NAME: &'static str;

    /// Size of one record in bytes.
    const STRIDE: usize = std::mem::size_of::<Self>();
}

/// Fixed-capacity, index-addressable buffer of `R` records.
///
/// No internal double buffering: a write lands in the service's buffer
/// immediately and may be issued more than once per frame. Frame pacing
/// between the update and render stages is the host layer's job.
pub struct GpuMirrorBuffer<R: GpuRecord> {
    /// Service that owns the device memory.
    service: Arc<dyn GpuBufferService>,
    /// Buffer inside the service.
    buffer: BufferId,
    /// Number of records the buffer holds.
    capacity: u32,
    _record: PhantomData<R>,
}

impl<R: GpuRecord> GpuMirrorBuffer<R> {
    /// Creates the backing buffer for `capacity` records.
    ///
    /// # Errors
    ///
    /// Propagates allocation failures from the service.
    pub fn new(service: Arc<dyn GpuBufferService>, capacity: u32) -> GpuResult<Self> {
        let buffer = service.create_buffer(R::NAME, R::STRIDE, capacity)?;
        Ok(Self {
            service,
            buffer,
            capacity,
            _record: PhantomData,
        })
    }

    /// Returns the fixed capacity in records.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the service buffer backing this mirror.
    #[inline]
    #[must_use]
    pub const fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    /// Returns the record stride in bytes.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        R::STRIDE
    }

    /// Fails with `OutOfCapacity` unless `index` addresses a slot.
    ///
    /// # Errors
    ///
    /// Returns [`GpuError::OutOfCapacity`] when `index >= capacity`.
    #[inline]
    pub const fn check_index(&self, index: u32) -> GpuResult<()> {
        if index >= self.capacity {
            return Err(GpuError::OutOfCapacity {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Overwrites the record at `index`.
    ///
    /// The whole record goes to the service in one call, so a failure leaves
    /// the previous record resident.
    ///
    /// # Errors
    ///
    /// Returns `OutOfCapacity` before contacting the service when
    /// `index >= capacity`; otherwise propagates service errors unchanged.
    pub fn write(&mut self, index: u32, record: &R) -> GpuResult<()> {
        self.check_index(index)?;
        self.service
            .write(self.buffer, index, bytemuck::bytes_of(record))
            .inspect_err(|error| tracing::warn!(record = R::NAME, index, %error, "gpu write failed"))?;
        tracing::trace!(record = R::NAME, index, "gpu record written");
        Ok(())
    }

    /// Reads the record currently resident at `index`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GpuMirrorBuffer::write`].
    pub fn read(&self, index: u32) -> GpuResult<R> {
        self.check_index(index)?;
        let mut record = R::zeroed();
        self.service
            .read(self.buffer, index, bytemuck::bytes_of_mut(&mut record))?;
        Ok(record)
    }
}

impl<R: GpuRecord> Drop for GpuMirrorBuffer<R> {
    fn drop(&mut self) {
        if let Err(error) = self.service.destroy_buffer(self.buffer) {
            tracing::warn!(record = R::NAME, buffer = ?self.buffer, %error, "failed to release gpu buffer");
        }
    }
}

impl<R: GpuRecord> fmt::Debug for GpuMirrorBuffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuMirrorBuffer")
            .field("record", &R::NAME)
            .field("buffer", &self.buffer)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HostBufferService;
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
    struct Sample {
        position: [f32; 3],
        tag: u32,
    }

    impl GpuRecord for Sample {
        const NAME: &'static str = "samples";
    }

    fn mirror(capacity: u32) -> (Arc<HostBufferService>, GpuMirrorBuffer<Sample>) {
        let service = Arc::new(HostBufferService::new());
        let mirror = GpuMirrorBuffer::new(service.clone(), capacity).unwrap();
        (service, mirror)
    }

    #[test]
    fn test_write_read_roundtrip_every_slot() {
        let (_, mut mirror) = mirror(8);

        for i in 0..8 {
            let record = Sample {
                position: [i as f32, -(i as f32), 0.5],
                tag: i * 3,
            };
            mirror.write(i, &record).unwrap();
            assert_eq!(mirror.read(i).unwrap(), record);
        }
    }

    #[test]
    fn test_capacity_checked_before_service() {
        let (service, mut mirror) = mirror(4);
        let before = service.resident_bytes(mirror.buffer_id()).unwrap();

        assert_eq!(
            mirror.write(4, &Sample::default()),
            Err(GpuError::OutOfCapacity { index: 4, capacity: 4 })
        );
        assert!(mirror.read(4).is_err());
        assert_eq!(service.resident_bytes(mirror.buffer_id()).unwrap(), before);
        assert_eq!(service.write_count(), 0);
    }

    #[test]
    fn test_service_error_leaves_previous_record() {
        let (service, mut mirror) = mirror(2);
        let original = Sample {
            position: [1.0, 2.0, 3.0],
            tag: 1,
        };
        mirror.write(1, &original).unwrap();

        service.fail_next_write(GpuError::OutOfDeviceMemory);
        let replacement = Sample { tag: 2, ..original };
        assert_eq!(mirror.write(1, &replacement), Err(GpuError::OutOfDeviceMemory));
        assert_eq!(mirror.read(1).unwrap(), original);
    }

    #[test]
    fn test_drop_releases_buffer() {
        let service = Arc::new(HostBufferService::with_budget(4 * Sample::STRIDE));
        let first = GpuMirrorBuffer::<Sample>::new(service.clone(), 4).unwrap();
        let first_id = first.buffer_id();
        assert!(GpuMirrorBuffer::<Sample>::new(service.clone(), 1).is_err());

        drop(first);
        assert_eq!(service.allocated_bytes(), 0);
        assert!(service.resident_bytes(first_id).is_none());

        let second = GpuMirrorBuffer::<Sample>::new(service.clone(), 4).unwrap();
        assert_eq!(service.allocated_bytes(), 4 * Sample::STRIDE);
        assert_ne!(second.buffer_id(), first_id);
    }

    #[test]
    fn test_buffer_created_with_record_stride() {
        let (service, mirror) = mirror(3);
        assert_eq!(mirror.stride(), 16);
        assert_eq!(service.allocated_bytes(), 48);
        assert_eq!(service.label(mirror.buffer_id()).as_deref(), Some("samples"));
    }
}
