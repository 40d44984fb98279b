//! In-memory buffer service.
//!
//! Backs every buffer with a plain byte vector. Used by headless servers,
//! tools, and tests; it is also the reference behavior device-backed
//! services are checked against.

use parking_lot::Mutex;

use crate::{BufferId, GpuBufferService, GpuError, GpuResult};

/// One host-resident buffer.
#[derive(Debug)]
struct HostBuffer {
    label: String,
    stride: usize,
    capacity: u32,
    bytes: Vec<u8>,
}

impl HostState {
    fn buffer(&self, id: BufferId) -> GpuResult<&HostBuffer> {
        self.buffers
            .get(id.raw() as usize)
            .and_then(Option::as_ref)
            .ok_or(GpuError::UnknownBuffer(id))
    }

    fn buffer_mut(&mut self, id: BufferId) -> GpuResult<&mut HostBuffer> {
        self.buffers
            .get_mut(id.raw() as usize)
            .and_then(Option::as_mut)
            .ok_or(GpuError::UnknownBuffer(id))
    }
}

impl HostBuffer {
    /// Byte range of slot `index`, after capacity and stride validation.
    fn slot_range(&self, index: u32, len: usize) -> GpuResult<std::ops::Range<usize>> {
        if index >= self.capacity {
            return Err(GpuError::OutOfCapacity {
                index,
                capacity: self.capacity,
            });
        }
        if len != self.stride {
            return Err(GpuError::StrideMismatch {
                expected: self.stride,
                actual: len,
            });
        }
        let start = index as usize * self.stride;
        Ok(start..start + self.stride)
    }
}

#[derive(Debug, Default)]
struct HostState {
    /// Indexed by `BufferId`; destroyed buffers leave `None`.
    buffers: Vec<Option<HostBuffer>>,
    /// Bytes currently allocated across all buffers.
    allocated: usize,
    /// Failure to report on the next write, then cleared.
    pending_failure: Option<GpuError>,
    /// Successful writes since creation.
    write_count: u64,
}

/// A [`GpuBufferService`] that keeps every buffer in host memory.
///
/// Unwritten records read back as all-zero bytes.
///
/// # Example
///
/// ```rust
/// use oroboros_gpu_mirror::{GpuBufferService, HostBufferService};
///
/// let service = HostBufferService::new();
/// let buffer = service.create_buffer("counters", 4, 8).unwrap();
/// service.write(buffer, 3, &7u32.to_ne_bytes()).unwrap();
///
/// let mut out = [0u8; 4];
/// service.read(buffer, 3, &mut out).unwrap();
/// assert_eq!(u32::from_ne_bytes(out), 7);
/// ```
#[derive(Debug)]
pub struct HostBufferService {
    state: Mutex<HostState>,
    /// Maximum bytes across all buffers.
    budget: usize,
}

impl HostBufferService {
    /// Creates a service with no memory budget.
    #[must_use]
    pub fn new() -> Self {
        Self::with_budget(usize::MAX)
    }

    /// Creates a service that refuses allocations beyond `budget` bytes in total.
    #[must_use]
    pub fn with_budget(budget: usize) -> Self {
        Self {
            state: Mutex::new(HostState::default()),
            budget,
        }
    }

    /// Makes the next write fail with `error` without touching memory.
    ///
    /// Stands in for device faults the host layer can report mid-frame.
    pub fn fail_next_write(&self, error: GpuError) {
        self.state.lock().pending_failure = Some(error);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.state.lock().write_count
    }

    /// Copy of a buffer's full contents, as the renderer would see it.
    #[must_use]
    pub fn resident_bytes(&self, buffer: BufferId) -> Option<Vec<u8>> {
        self.state.lock().buffer(buffer).ok().map(|b| b.bytes.clone())
    }

    /// Debug label a buffer was created with.
    #[must_use]
    pub fn label(&self, buffer: BufferId) -> Option<String> {
        self.state.lock().buffer(buffer).ok().map(|b| b.label.clone())
    }

    /// Total bytes held by live buffers.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.state.lock().allocated
    }
}

impl Default for HostBufferService {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuBufferService for HostBufferService {
    fn create_buffer(&self, label: &str, stride: usize, capacity: u32) -> GpuResult<BufferId> {
        let size = stride
            .checked_mul(capacity as usize)
            .ok_or(GpuError::OutOfHostMemory)?;

        let mut state = self.state.lock();
        if state.allocated.saturating_add(size) > self.budget {
            return Err(GpuError::OutOfHostMemory);
        }
        let id = u32::try_from(state.buffers.len()).map_err(|_| GpuError::OutOfHostMemory)?;

        state.allocated += size;
        state.buffers.push(Some(HostBuffer {
            label: label.to_owned(),
            stride,
            capacity,
            bytes: vec![0; size],
        }));

        tracing::debug!(label, stride, capacity, "host buffer created");
        Ok(BufferId::new(id))
    }

    fn destroy_buffer(&self, buffer: BufferId) -> GpuResult<()> {
        let mut state = self.state.lock();
        let released = state
            .buffers
            .get_mut(buffer.raw() as usize)
            .and_then(Option::take)
            .ok_or(GpuError::UnknownBuffer(buffer))?;

        state.allocated -= released.bytes.len();
        tracing::debug!(label = %released.label, "host buffer destroyed");
        Ok(())
    }

    fn write(&self, buffer: BufferId, index: u32, bytes: &[u8]) -> GpuResult<()> {
        let mut state = self.state.lock();
        if let Some(error) = state.pending_failure.take() {
            return Err(error);
        }

        let target = state.buffer_mut(buffer)?;
        let range = target.slot_range(index, bytes.len())?;
        target.bytes[range].copy_from_slice(bytes);

        state.write_count += 1;
        Ok(())
    }

    fn read(&self, buffer: BufferId, index: u32, out: &mut [u8]) -> GpuResult<()> {
        let state = self.state.lock();
        let source = state.buffer(buffer)?;
        let range = source.slot_range(index, out.len())?;
        out.copy_from_slice(&source.bytes[range]);
        Ok(())
    }
}
