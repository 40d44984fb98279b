//! Force fields.
//!
//! Same lifecycle as emitters with a narrower record and nothing transient:
//! every write rebuilds the record from CPU state.

use std::sync::Arc;

use oroboros_gpu_mirror::{GpuBufferService, GpuMirrorBuffer, GpuResult};
use oroboros_pool::{Handle, SlotPool};

use crate::node::Node;
use crate::records::{ForceFieldKind, ForceFieldRecord};
use crate::ResourceResult;

/// Default maximum concurrent force fields
pub const MAX_FORCE_FIELDS: u32 = 64;

/// Configuration of a force field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceFieldConfig {
    /// Falloff shape
    pub kind: ForceFieldKind,
    /// Origin, local to the node
    pub position: [f32; 3],
    /// Axis for directional and vortex fields
    pub direction: [f32; 3],
    /// Signed strength
    pub strength: f32,
    /// Radius of influence
    pub radius: f32,
    /// Falloff exponent
    pub falloff: f32,
}

impl Default for ForceFieldConfig {
    fn default() -> Self {
        Self {
            kind: ForceFieldKind::Point,
            position: [0.0; 3],
            direction: [0.0, 1.0, 0.0],
            strength: 1.0,
            radius: 5.0,
            falloff: 2.0,
        }
    }
}

/// A force field (CPU side).
#[derive(Debug, Clone, PartialEq)]
pub struct ForceField {
    /// Field parameters
    pub config: ForceFieldConfig,
    /// CPU-only switch; not mirrored.
    pub enabled: bool,
    node: Handle<Node>,
}

impl ForceField {
    /// Node this field follows. Weak.
    #[must_use]
    pub const fn node(&self) -> Handle<Node> {
        self.node
    }

    /// Builds the GPU record. Only the node index is derived.
    #[must_use]
    pub fn to_record(&self) -> ForceFieldRecord {
        let config = &self.config;
        ForceFieldRecord {
            position: config.position,
            strength: config.strength,
            direction: config.direction,
            radius: config.radius,
            kind: config.kind as u32,
            falloff: config.falloff,
            node_index: self.node.index(),
            enabled: 1,
        }
    }
}

/// Owns every force field and its GPU mirror.
#[derive(Debug)]
pub struct ForceFieldManager {
    pool: SlotPool<ForceField>,
    mirror: GpuMirrorBuffer<ForceFieldRecord>,
    hide_on_destroy: bool,
}

impl ForceFieldManager {
    /// Creates a manager for `capacity` fields.
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

    /// Creates a field bound to `node` and writes its record.
    ///
    /// # Errors
    ///
    /// `AllocationFailed`, or the GPU write error (the slot is released again).
    pub fn create(&mut self, node: Handle<Node>, config: ForceFieldConfig) -> ResourceResult<Handle<ForceField>> {
        let handle = self.pool.allocate_with(ForceField {
            config,
            enabled: true,
            node,
        })?;

        if let Err(error) = self.write_to_gpu(handle) {
            self.pool.free(handle);
            tracing::warn!(?handle, %error, "force field creation rolled back");
            return Err(error);
        }

        tracing::debug!(?handle, ?node, "force field created");
        Ok(handle)
    }

    /// Destroys a field. Returns false for invalid handles.
    pub fn destroy(&mut self, handle: Handle<ForceField>) -> bool {
        if !self.pool.free(handle) {
            return false;
        }

        if self.hide_on_destroy {
            if let Err(error) = self.disable_slot(handle.index()) {
                tracing::warn!(?handle, %error, "failed to disable destroyed force field");
            }
        }

        tracing::debug!(?handle, "force field destroyed");
        true
    }

    /// Rebuilds the field's record and writes it.
    ///
    /// # Errors
    ///
    /// `OutOfCapacity` (checked first), `InvalidHandle`, or the buffer error.
    pub fn write_to_gpu(&mut self, handle: Handle<ForceField>) -> ResourceResult<()> {
        let index = handle.index();
        self.mirror.check_index(index)?;
        let record = self.pool.get(handle)?.to_record();
        self.mirror.write(index, &record)?;
        Ok(())
    }

    /// Gets a field.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get(&self, handle: Handle<ForceField>) -> ResourceResult<&ForceField> {
        Ok(self.pool.get(handle)?)
    }

    /// Gets a field for in-place edits.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get_mut(&mut self, handle: Handle<ForceField>) -> ResourceResult<&mut ForceField> {
        Ok(self.pool.get_mut(handle)?)
    }

    /// Replaces a field's configuration.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn update(&mut self, handle: Handle<ForceField>, config: ForceFieldConfig) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.config = config;
        Ok(())
    }

    /// Rebinds the node.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn set_node(&mut self, handle: Handle<ForceField>, node: Handle<Node>) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.node = node;
        Ok(())
    }

    /// Reads the resident record of a live field.
    ///
    /// # Errors
    ///
    /// `InvalidHandle`, or the buffer read error.
    pub fn record(&self, handle: Handle<ForceField>) -> ResourceResult<ForceFieldRecord> {
        self.pool.get(handle)?;
        Ok(self.mirror.read(handle.index())?)
    }

    /// Number of live fields.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Maximum number of fields.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.mirror.capacity()
    }

    /// Iterates over live fields.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<ForceField>, &ForceField)> {
        self.pool.iter()
    }

    /// The GPU mirror, for binding by the renderer.
    #[must_use]
    pub const fn mirror(&self) -> &GpuMirrorBuffer<ForceFieldRecord> {
        &self.mirror
    }

    fn disable_slot(&mut self, index: u32) -> GpuResult<()> {
        let mut record = self.mirror.read(index)?;
        record.enabled = 0;
        self.mirror.write(index, &record)
    }
}
