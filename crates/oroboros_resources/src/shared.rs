//! # Shared Resource Manager
//!
//! Thread-shareable form of [`Manager`]: one lock per manager kind, so a
//! thread editing emitters never blocks one creating nodes.
//!
//! ```text
//!   gameplay thread ──> nodes() ──────────┐
//!                                         ├──> SharedManager
//!   effects thread ───> emitters() ───────┘
//! ```
//!
//! Locks are never taken in a nested order by this type. Callers holding
//! two guards at once should acquire them in declaration order (emitters,
//! force fields, nodes, clips).

use std::sync::Arc;

use oroboros_gpu_mirror::GpuBufferService;
use parking_lot::{Mutex, MutexGuard};

use crate::animation::{AnimationAuthoring, AnimationClipManager};
use crate::config::ResourceConfig;
use crate::emitter::EmitterManager;
use crate::force_field::ForceFieldManager;
use crate::manager::{Manager, ResourceStats};
use crate::node::NodeManager;
use crate::ResourceResult;

/// Resource managers behind per-kind locks.
#[derive(Debug)]
pub struct SharedManager {
    emitters: Mutex<EmitterManager>,
    force_fields: Mutex<ForceFieldManager>,
    nodes: Mutex<NodeManager>,
    clips: Mutex<AnimationClipManager>,
}

impl SharedManager {
    /// Builds every manager from `config`.
    ///
    /// # Errors
    ///
    /// As [`Manager::new`].
    pub fn new(
        config: ResourceConfig,
        service: Arc<dyn GpuBufferService>,
        authoring: Arc<dyn AnimationAuthoring>,
    ) -> ResourceResult<Self> {
        Ok(Manager::new(config, service, authoring)?.into_shared())
    }

    pub(crate) fn from_parts(
        emitters: EmitterManager,
        force_fields: ForceFieldManager,
        nodes: NodeManager,
        clips: AnimationClipManager,
    ) -> Self {
        Self {
            emitters: Mutex::new(emitters),
            force_fields: Mutex::new(force_fields),
            nodes: Mutex::new(nodes),
            clips: Mutex::new(clips),
        }
    }

    /// Locks the emitter manager.
    pub fn emitters(&self) -> MutexGuard<'_, EmitterManager> {
        self.emitters.lock()
    }

    /// Locks the force field manager.
    pub fn force_fields(&self) -> MutexGuard<'_, ForceFieldManager> {
        self.force_fields.lock()
    }

    /// Locks the node manager.
    pub fn nodes(&self) -> MutexGuard<'_, NodeManager> {
        self.nodes.lock()
    }

    /// Locks the animation clip manager.
    pub fn clips(&self) -> MutexGuard<'_, AnimationClipManager> {
        self.clips.lock()
    }

    /// Live counts per kind. Each count is taken under its own lock, so the
    /// snapshot is not atomic across kinds.
    #[must_use]
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            emitters: self.emitters.lock().count(),
            force_fields: self.force_fields.lock().count(),
            nodes: self.nodes.lock().count(),
            animation_clips: self.clips.lock().count(),
        }
    }
}

// Send + Sync follows from the parts:
// - every manager is Send (collaborators are Arc<dyn .. + Send + Sync>)
// - parking_lot::Mutex<T: Send> is Sync
