//! # OROBOROS GPU Mirror
//!
//! Fixed-capacity, index-addressable buffers of GPU records.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Resource manager ──write(index, record)──▶ GpuMirrorBuffer   │
//! │                    ◀──read(index)────────                     │
//! │                                   │                           │
//! │                       GpuBufferService (bytes, per slot)      │
//! │                     ┌─────────────┴─────────────┐             │
//! │             HostBufferService          WgpuBufferService      │
//! │              (in memory)                (feature = "wgpu")    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The renderer binds the service's buffer directly; it never sees the
//! slot pools that feed it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod error;
mod host;
mod mirror;
mod service;
#[cfg(feature = "wgpu")]
mod wgpu_service;

pub use error::{GpuError, GpuResult};
pub use host::HostBufferService;
pub use mirror::{GpuMirrorBuffer, GpuRecord};
pub use service::{BufferId, GpuBufferService};
#[cfg(feature = "wgpu")]
pub use wgpu_service::WgpuBufferService;
