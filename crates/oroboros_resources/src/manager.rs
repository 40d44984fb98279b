//! # Resource Manager
//!
//! One value owning every resource pool, built from a single
//! [`ResourceConfig`]. This is the entry point the renderer's update stage
//! drives each frame:
//!
//! ```text
//!   gameplay ──> create_* / destroy_* / get_mut ──> Manager
//!                                                      │
//!                                     write_*_to_gpu   │
//!                                                      ▼
//!                                          GpuBufferService ──> renderer
//! ```
//!
//! Single writer. Threads that need concurrent access go through
//! [`Manager::into_shared`].

use std::sync::Arc;

use oroboros_gpu_mirror::GpuBufferService;
use oroboros_pool::Handle;

use crate::animation::{AnimationAuthoring, AnimationClip, AnimationClipManager};
use crate::config::ResourceConfig;
use crate::emitter::{Emitter, EmitterConfig, EmitterManager};
use crate::force_field::{ForceField, ForceFieldConfig, ForceFieldManager};
use crate::node::{Node, NodeManager};
use crate::shared::SharedManager;
use crate::ResourceResult;

/// Live resource counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Live emitters.
    pub emitters: usize,
    /// Live force fields.
    pub force_fields: usize,
    /// Live scene nodes.
    pub nodes: usize,
    /// Live animation clips.
    pub animation_clips: usize,
}

impl ResourceStats {
    /// Sum over every kind.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.emitters + self.force_fields + self.nodes + self.animation_clips
    }
}

/// Owns all resource managers.
#[derive(Debug)]
pub struct Manager {
    emitters: EmitterManager,
    force_fields: ForceFieldManager,
    nodes: NodeManager,
    clips: AnimationClipManager,
}

impl Manager {
    /// Builds every manager from `config`.
    ///
    /// GPU buffers for emitters and force fields are created on `service`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `config` fails validation, or the service's
    /// buffer allocation error.
    pub fn new(
        config: ResourceConfig,
        service: Arc<dyn GpuBufferService>,
        authoring: Arc<dyn AnimationAuthoring>,
    ) -> ResourceResult<Self> {
        config.validate()?;

        let manager = Self {
            emitters: EmitterManager::new(service.clone(), config.max_emitters, config.hide_on_destroy)?,
            force_fields: ForceFieldManager::new(service, config.max_force_fields, config.hide_on_destroy)?,
            nodes: NodeManager::new(config.max_nodes),
            clips: AnimationClipManager::new(authoring, config.max_animation_clips),
        };

        tracing::debug!(?config, "resource manager ready");
        Ok(manager)
    }

    /// Emitter manager.
    #[must_use]
    pub const fn emitters(&self) -> &EmitterManager {
        &self.emitters
    }

    /// Emitter manager, mutable.
    pub fn emitters_mut(&mut self) -> &mut EmitterManager {
        &mut self.emitters
    }

    /// Force field manager.
    #[must_use]
    pub const fn force_fields(&self) -> &ForceFieldManager {
        &self.force_fields
    }

    /// Force field manager, mutable.
    pub fn force_fields_mut(&mut self) -> &mut ForceFieldManager {
        &mut self.force_fields
    }

    /// Node manager.
    #[must_use]
    pub const fn nodes(&self) -> &NodeManager {
        &self.nodes
    }

    /// Node manager, mutable.
    pub fn nodes_mut(&mut self) -> &mut NodeManager {
        &mut self.nodes
    }

    /// Animation clip manager.
    #[must_use]
    pub const fn clips(&self) -> &AnimationClipManager {
        &self.clips
    }

    /// Animation clip manager, mutable.
    pub fn clips_mut(&mut self) -> &mut AnimationClipManager {
        &mut self.clips
    }

    // ========================================================================
    // Pass-throughs
    // ========================================================================

    /// See [`EmitterManager::create`].
    ///
    /// # Errors
    ///
    /// As [`EmitterManager::create`].
    pub fn create_emitter(&mut self, node: Handle<Node>, config: EmitterConfig) -> ResourceResult<Handle<Emitter>> {
        self.emitters.create(node, config)
    }

    /// See [`EmitterManager::destroy`].
    pub fn destroy_emitter(&mut self, handle: Handle<Emitter>) -> bool {
        self.emitters.destroy(handle)
    }

    /// See [`EmitterManager::write_to_gpu`].
    ///
    /// # Errors
    ///
    /// As [`EmitterManager::write_to_gpu`].
    pub fn write_emitter_to_gpu(&mut self, handle: Handle<Emitter>, preserve_time_accumulator: bool) -> ResourceResult<()> {
        self.emitters.write_to_gpu(handle, preserve_time_accumulator)
    }

    /// See [`ForceFieldManager::create`].
    ///
    /// # Errors
    ///
    /// As [`ForceFieldManager::create`].
    pub fn create_force_field(
        &mut self,
        node: Handle<Node>,
        config: ForceFieldConfig,
    ) -> ResourceResult<Handle<ForceField>> {
        self.force_fields.create(node, config)
    }

    /// See [`ForceFieldManager::destroy`].
    pub fn destroy_force_field(&mut self, handle: Handle<ForceField>) -> bool {
        self.force_fields.destroy(handle)
    }

    /// See [`ForceFieldManager::write_to_gpu`].
    ///
    /// # Errors
    ///
    /// As [`ForceFieldManager::write_to_gpu`].
    pub fn write_force_field_to_gpu(&mut self, handle: Handle<ForceField>) -> ResourceResult<()> {
        self.force_fields.write_to_gpu(handle)
    }

    /// See [`NodeManager::create`].
    ///
    /// # Errors
    ///
    /// As [`NodeManager::create`].
    pub fn create_node(&mut self, node: Node) -> ResourceResult<Handle<Node>> {
        self.nodes.create(node)
    }

    /// See [`NodeManager::destroy`].
    ///
    /// Resources bound to the node keep their handle.
    pub fn destroy_node(&mut self, handle: Handle<Node>) -> bool {
        self.nodes.destroy(handle)
    }

    /// See [`AnimationClipManager::create`].
    ///
    /// # Errors
    ///
    /// As [`AnimationClipManager::create`].
    pub fn create_clip(&mut self, channel_count: u32, duration: f32, name: &str) -> ResourceResult<Handle<AnimationClip>> {
        self.clips.create(channel_count, duration, name)
    }

    /// See [`AnimationClipManager::destroy`].
    pub fn destroy_clip(&mut self, handle: Handle<AnimationClip>) -> bool {
        self.clips.destroy(handle)
    }

    /// Live counts per kind.
    #[must_use]
    pub const fn stats(&self) -> ResourceStats {
        ResourceStats {
            emitters: self.emitters.count(),
            force_fields: self.force_fields.count(),
            nodes: self.nodes.count(),
            animation_clips: self.clips.count(),
        }
    }

    /// Splits into one lock per manager for multi-threaded use.
    #[must_use]
    pub fn into_shared(self) -> SharedManager {
        SharedManager::from_parts(self.emitters, self.force_fields, self.nodes, self.clips)
    }
}
