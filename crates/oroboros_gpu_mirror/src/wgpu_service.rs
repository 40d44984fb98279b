//! WGPU-backed buffer service.
//!
//! Buffers live in device memory as storage buffers. Writes go through
//! `Queue::write_buffer`. Reads copy the slot into a per-buffer staging
//! buffer and wait for the mapping, so they observe whatever compute passes
//! left on the device. A read blocks until the queue drains up to the copy;
//! it is meant for the occasional read-modify-write, not per-frame scans.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{BufferId, GpuBufferService, GpuError, GpuResult};

struct DeviceBuffer {
    buffer: wgpu::Buffer,
    /// One-slot `MAP_READ` buffer used for readback.
    readback: wgpu::Buffer,
    stride: usize,
    capacity: u32,
}

impl DeviceBuffer {
    fn slot_range(&self, index: u32, len: usize) -> GpuResult<std::ops::Range<u64>> {
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
        let start = u64::from(index) * self.stride as u64;
        Ok(start..start + self.stride as u64)
    }
}

/// A [`GpuBufferService`] on top of a `wgpu` device and queue.
pub struct WgpuBufferService {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    /// Indexed by `BufferId`; destroyed buffers leave `None`.
    buffers: Mutex<Vec<Option<DeviceBuffer>>>,
}

impl WgpuBufferService {
    /// Creates a service that allocates on `device` and uploads through `queue`.
    #[must_use]
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Runs `f` with the device buffer behind `id`, e.g. to build a bind group.
    pub fn with_buffer<T>(&self, id: BufferId, f: impl FnOnce(&wgpu::Buffer) -> T) -> Option<T> {
        let buffers = self.buffers.lock();
        buffers
            .get(id.raw() as usize)
            .and_then(Option::as_ref)
            .map(|b| f(&b.buffer))
    }
}

impl GpuBufferService for WgpuBufferService {
    fn create_buffer(&self, label: &str, stride: usize, capacity: u32) -> GpuResult<BufferId> {
        let stride_bytes = stride as u64;
        if stride_bytes % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(GpuError::StrideMismatch {
                expected: stride.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize),
                actual: stride,
            });
        }
        let size = stride_bytes
            .checked_mul(u64::from(capacity))
            .ok_or(GpuError::OutOfDeviceMemory)?;
        if size > self.device.limits().max_buffer_size {
            return Err(GpuError::OutOfDeviceMemory);
        }

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut buffers = self.buffers.lock();
        let id = u32::try_from(buffers.len()).map_err(|_| GpuError::OutOfHostMemory)?;
        buffers.push(Some(DeviceBuffer {
            buffer,
            readback,
            stride,
            capacity,
        }));

        tracing::debug!(label, stride, capacity, "device buffer created");
        Ok(BufferId::new(id))
    }

    fn destroy_buffer(&self, buffer: BufferId) -> GpuResult<()> {
        let mut buffers = self.buffers.lock();
        let released = buffers
            .get_mut(buffer.raw() as usize)
            .and_then(Option::take)
            .ok_or(GpuError::UnknownBuffer(buffer))?;

        released.buffer.destroy();
        released.readback.destroy();
        tracing::debug!(?buffer, "device buffer destroyed");
        Ok(())
    }

    fn write(&self, buffer: BufferId, index: u32, bytes: &[u8]) -> GpuResult<()> {
        let buffers = self.buffers.lock();
        let target = buffers
            .get(buffer.raw() as usize)
            .and_then(Option::as_ref)
            .ok_or(GpuError::UnknownBuffer(buffer))?;
        let range = target.slot_range(index, bytes.len())?;

        self.queue.write_buffer(&target.buffer, range.start, bytes);
        Ok(())
    }

    fn read(&self, buffer: BufferId, index: u32, out: &mut [u8]) -> GpuResult<()> {
        // Held across the wait so no other read reuses the staging buffer
        let buffers = self.buffers.lock();
        let source = buffers
            .get(buffer.raw() as usize)
            .and_then(Option::as_ref)
            .ok_or(GpuError::UnknownBuffer(buffer))?;
        let range = source.slot_range(index, out.len())?;

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("slot readback") });
        encoder.copy_buffer_to_buffer(&source.buffer, range.start, &source.readback, 0, range.end - range.start);
        // Pending write_buffer uploads are flushed ahead of this submission
        let submission = self.queue.submit(Some(encoder.finish()));

        let mapped = Arc::new(Mutex::new(None));
        let signal = Arc::clone(&mapped);
        let slice = source.readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            *signal.lock() = Some(result);
        });
        let _ = self
            .device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));

        let result = mapped.lock().take();
        match result {
            Some(Ok(())) => {}
            Some(Err(error)) => {
                tracing::warn!(?buffer, index, %error, "slot readback failed");
                return Err(GpuError::DeviceLost);
            }
            None => {
                tracing::warn!(?buffer, index, "slot readback never completed");
                return Err(GpuError::DeviceLost);
            }
        }

        out.copy_from_slice(&slice.get_mapped_range());
        source.readback.unmap();
        Ok(())
    }
}
