//! # OROBOROS Resources
//!
//! Pooled game-object resources and their GPU mirrors:
//! - Particle emitters and force fields, each slot mirrored byte-exact to a
//!   storage buffer the renderer binds directly
//! - Scene nodes and animation clips, CPU only
//! - Weak links between resources are plain handles
//!
//! ## Emitter Write Protocol
//!
//! The simulation pass advances each emitter's time accumulator on the GPU.
//! A CPU write that must not restart the emitter reads that value back and
//! merges it into the new record:
//!
//! ```rust
//! use std::sync::Arc;
//! use oroboros_resources::{EmitterConfig, EmitterManager, Handle, HostBufferService};
//!
//! let service = Arc::new(HostBufferService::new());
//! let mut emitters = EmitterManager::new(service, 16, false).unwrap();
//!
//! let handle = emitters
//!     .create(Handle::from_raw_parts(0, 0), EmitterConfig::default())
//!     .unwrap();
//!
//! emitters.update(handle, EmitterConfig::default().with_emission_rate(8.0)).unwrap();
//! emitters.write_to_gpu(handle, true).unwrap();
//! assert_eq!(emitters.record(handle).unwrap().emission_rate, 8.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod config;
pub mod emitter;
pub mod error;
pub mod force_field;
pub mod manager;
pub mod node;
pub mod records;
pub mod shared;
pub mod texture;

pub use animation::{AnimationAuthoring, AnimationClip, AnimationClipManager, ClipPayload};
pub use config::ResourceConfig;
pub use emitter::{merge_record, Emitter, EmitterConfig, EmitterManager, EmitterTransient};
pub use error::{AuthoringError, ResourceError, ResourceResult};
pub use force_field::{ForceField, ForceFieldConfig, ForceFieldManager};
pub use manager::{Manager, ResourceStats};
pub use node::{Node, NodeFlags, NodeManager};
pub use records::{EmitterRecord, ForceFieldKind, ForceFieldRecord, INVALID_INDEX};
pub use shared::SharedManager;
pub use texture::Texture;

pub use oroboros_gpu_mirror::{GpuBufferService, GpuError, GpuMirrorBuffer, GpuRecord, HostBufferService};
pub use oroboros_pool::{Handle, PoolError};
