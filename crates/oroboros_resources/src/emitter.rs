//! Particle emitters.
//!
//! Architecture:
//! 1. The CPU owns an emitter's configuration and its weak links (node, texture)
//! 2. The GPU owns the time accumulator, advanced by the simulation pass
//! 3. `write_to_gpu` merges the two into one [`EmitterRecord`]
//!
//! Structural edits (a script bumping the emission rate) must not restart an
//! emitter that is mid-flight, so writes read the resident accumulator back
//! first. Creation starts from zero.

use std::sync::Arc;

use oroboros_gpu_mirror::{GpuBufferService, GpuMirrorBuffer, GpuResult};
use oroboros_pool::{Handle, SlotPool};

use crate::node::Node;
use crate::records::{EmitterRecord, INVALID_INDEX};
use crate::texture::Texture;
use crate::ResourceResult;

/// Default maximum concurrent emitters
pub const MAX_EMITTERS: u32 = 256;

/// Configuration of an emitter's physical parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    /// Initial particle velocity
    pub velocity: [f32; 3],
    /// Particles per second
    pub emission_rate: f32,
    /// Starting color (RGBA)
    pub color_start: [f32; 4],
    /// Ending color (RGBA)
    pub color_end: [f32; 4],
    /// Velocity spread per axis
    pub spread: [f32; 3],
    /// Particle lifetime in seconds
    pub lifetime: f32,
    /// Starting size
    pub size_start: f32,
    /// Ending size
    pub size_end: f32,
    /// Starting gravity weight
    pub weight_start: f32,
    /// Ending gravity weight
    pub weight_end: f32,
    /// Local bounding box min
    pub bounds_min: [f32; 3],
    /// Local bounding box max
    pub bounds_max: [f32; 3],
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            velocity: [0.0, 5.0, 0.0],
            emission_rate: 10.0,
            color_start: [1.0, 1.0, 1.0, 1.0],
            color_end: [1.0, 1.0, 1.0, 0.0],
            spread: [1.0, 0.0, 1.0],
            lifetime: 2.0,
            size_start: 0.1,
            size_end: 0.01,
            weight_start: 1.0,
            weight_end: 1.0,
            bounds_min: [-1.0, -1.0, -1.0],
            bounds_max: [1.0, 1.0, 1.0],
        }
    }
}

impl EmitterConfig {
    /// Sets the emission rate.
    #[must_use]
    pub const fn with_emission_rate(mut self, rate: f32) -> Self {
        self.emission_rate = rate;
        self
    }

    /// Sets the initial velocity and its spread.
    #[must_use]
    pub const fn with_velocity(mut self, velocity: [f32; 3], spread: [f32; 3]) -> Self {
        self.velocity = velocity;
        self.spread = spread;
        self
    }

    /// Sets the color gradient.
    #[must_use]
    pub const fn with_colors(mut self, start: [f32; 4], end: [f32; 4]) -> Self {
        self.color_start = start;
        self.color_end = end;
        self
    }

    /// Sets the particle lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Sets the local bounding box.
    #[must_use]
    pub const fn with_bounds(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.bounds_min = min;
        self.bounds_max = max;
        self
    }
}

/// A particle emitter (CPU side).
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    /// Physical parameters
    pub config: EmitterConfig,
    /// CPU-only switch read by the simulation scheduler; not mirrored.
    pub enabled: bool,
    /// Node providing the transform. Weak: the node may already be gone.
    node: Handle<Node>,
    /// Texture sampled by particles. Weak.
    texture: Option<Handle<Texture>>,
}

impl Emitter {
    /// Creates an enabled emitter bound to `node`, with no texture.
    #[must_use]
    pub const fn new(node: Handle<Node>, config: EmitterConfig) -> Self {
        Self {
            config,
            enabled: true,
            node,
            texture: None,
        }
    }

    /// Node this emitter follows.
    #[must_use]
    pub const fn node(&self) -> Handle<Node> {
        self.node
    }

    /// Texture this emitter samples, if any.
    #[must_use]
    pub const fn texture(&self) -> Option<Handle<Texture>> {
        self.texture
    }
}

/// Fields of an [`EmitterRecord`] that evolve on the GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EmitterTransient {
    /// Seconds of emission accumulated by the simulation step.
    pub time_accumulator: f32,
}

impl EmitterTransient {
    /// Captures the transient fields of a resident record.
    #[must_use]
    pub const fn from_record(record: &EmitterRecord) -> Self {
        Self {
            time_accumulator: record.time_accumulator,
        }
    }
}

/// Builds the full GPU record for `emitter`.
///
/// Pure: no buffer access. Derived fields come from the emitter's handles,
/// `visible` is forced on, and the accumulator is taken from `previous` or
/// reset to zero.
#[must_use]
pub fn merge_record(emitter: &Emitter, previous: Option<EmitterTransient>) -> EmitterRecord {
    let config = &emitter.config;
    EmitterRecord {
        velocity: config.velocity,
        emission_rate: config.emission_rate,
        color_start: config.color_start,
        color_end: config.color_end,
        spread: config.spread,
        lifetime: config.lifetime,
        size_start: config.size_start,
        size_end: config.size_end,
        weight_start: config.weight_start,
        weight_end: config.weight_end,
        time_accumulator: previous.map_or(0.0, |t| t.time_accumulator),
        texture_index: emitter.texture.map_or(INVALID_INDEX, Handle::index),
        node_index: emitter.node.index(),
        visible: 1,
        bounds_min: config.bounds_min,
        _pad0: 0.0,
        bounds_max: config.bounds_max,
        _pad1: 0.0,
    }
}

/// Owns every emitter and its GPU mirror.
///
/// Pool slot `i` and mirror slot `i` describe the same emitter. A destroyed
/// emitter's record stays resident until the slot is reused, unless
/// `hide_on_destroy` is set; consumers must check `visible`.
#[derive(Debug)]
pub struct EmitterManager {
    pool: SlotPool<Emitter>,
    mirror: GpuMirrorBuffer<EmitterRecord>,
    hide_on_destroy: bool,
}

impl EmitterManager {
    /// Creates a manager for `capacity` emitters.
    ///
    /// # Errors
    ///
    /// Propagates buffer allocation failures from the service.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(
        service: Arc<dyn GpuBufferService>,
        capacity: u32,
        hide_on_destroy: bool,
    ) -> ResourceResult<Self> {
        Ok(Self {
            pool: SlotPool::new(capacity as usize),
            mirror: GpuMirrorBuffer::new(service, capacity)?,
            hide_on_destroy,
        })
    }

    /// Creates an emitter bound to `node` and writes its first record.
    ///
    /// The accumulator starts at zero. If the write fails the slot is
    /// released again and no handle is produced.
    ///
    /// # Errors
    ///
    /// `AllocationFailed` when every slot is live, or the GPU write error.
    pub fn create(&mut self, node: Handle<Node>, config: EmitterConfig) -> ResourceResult<Handle<Emitter>> {
        let handle = self.pool.allocate_with(Emitter::new(node, config))?;

        if let Err(error) = self.write_to_gpu(handle, false) {
            self.pool.free(handle);
            tracing::warn!(?handle, %error, "emitter creation rolled back");
            return Err(error);
        }

        tracing::debug!(?handle, ?node, "emitter created");
        Ok(handle)
    }

    /// Destroys an emitter. Returns false for invalid handles.
    ///
    /// Does not write to the GPU unless `hide_on_destroy` is set.
    pub fn destroy(&mut self, handle: Handle<Emitter>) -> bool {
        if !self.pool.free(handle) {
            return false;
        }

        if self.hide_on_destroy {
            if let Err(error) = self.hide_slot(handle.index()) {
                tracing::warn!(?handle, %error, "failed to hide destroyed emitter");
            }
        }

        tracing::debug!(?handle, "emitter destroyed");
        true
    }

    /// Writes the emitter's record to its mirror slot.
    ///
    /// With `preserve_time_accumulator` the resident accumulator is read back
    /// and carried over; without it the accumulator restarts at zero.
    ///
    /// # Errors
    ///
    /// - `OutOfCapacity` if the handle's index is past the mirror, before any
    ///   buffer access
    /// - `InvalidHandle` for stale or freed handles
    /// - Any buffer service error, unchanged. The resident record is not
    ///   modified on error.
    pub fn write_to_gpu(&mut self, handle: Handle<Emitter>, preserve_time_accumulator: bool) -> ResourceResult<()> {
        let index = handle.index();
        self.mirror.check_index(index)?;
        let emitter = self.pool.get(handle)?;

        let previous = if preserve_time_accumulator {
            Some(EmitterTransient::from_record(&self.mirror.read(index)?))
        } else {
            None
        };

        let record = merge_record(emitter, previous);
        self.mirror.write(index, &record)?;
        Ok(())
    }

    /// Gets an emitter.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get(&self, handle: Handle<Emitter>) -> ResourceResult<&Emitter> {
        Ok(self.pool.get(handle)?)
    }

    /// Gets an emitter for in-place edits. Follow with [`Self::write_to_gpu`].
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get_mut(&mut self, handle: Handle<Emitter>) -> ResourceResult<&mut Emitter> {
        Ok(self.pool.get_mut(handle)?)
    }

    /// Replaces an emitter's configuration.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn update(&mut self, handle: Handle<Emitter>, config: EmitterConfig) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.config = config;
        Ok(())
    }

    /// Binds or unbinds the texture.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn set_texture(&mut self, handle: Handle<Emitter>, texture: Option<Handle<Texture>>) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.texture = texture;
        Ok(())
    }

    /// Rebinds the node.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn set_node(&mut self, handle: Handle<Emitter>, node: Handle<Node>) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.node = node;
        Ok(())
    }

    /// Reads the record resident on the GPU for a live emitter.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles, or the buffer read error.
    pub fn record(&self, handle: Handle<Emitter>) -> ResourceResult<EmitterRecord> {
        self.pool.get(handle)?;
        Ok(self.mirror.read(handle.index())?)
    }

    /// Number of live emitters.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Maximum number of emitters.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.mirror.capacity()
    }

    /// Iterates over live emitters.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<Emitter>, &Emitter)> {
        self.pool.iter()
    }

    /// The GPU mirror, for binding by the renderer.
    #[must_use]
    pub const fn mirror(&self) -> &GpuMirrorBuffer<EmitterRecord> {
        &self.mirror
    }

    fn hide_slot(&mut self, index: u32) -> GpuResult<()> {
        let mut record = self.mirror.read(index)?;
        record.visible = 0;
        self.mirror.write(index, &record)
    }
}
