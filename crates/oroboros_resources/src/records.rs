//! GPU record layouts.
//!
//! Each record is one element of a storage buffer read by shader code.
//! Rows are 16 bytes; a `vec3` is always followed by a scalar or an explicit
//! pad so the struct matches std430 packing exactly.

use bytemuck::{Pod, Zeroable};
use oroboros_gpu_mirror::GpuRecord;

/// Index value meaning "no resource bound".
pub const INVALID_INDEX: u32 = u32::MAX;

/// Per-emitter data consumed by the particle spawn and update passes.
///
/// `time_accumulator` is advanced on the device by the simulation step;
/// CPU writes preserve it unless explicitly resetting.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EmitterRecord {
    /// Initial particle velocity.
    pub velocity: [f32; 3],
    /// Particles spawned per second.
    pub emission_rate: f32,
    /// Color at birth (rgba).
    pub color_start: [f32; 4],
    /// Color at death (rgba).
    pub color_end: [f32; 4],
    /// Random spread applied to velocity, per axis.
    pub spread: [f32; 3],
    /// Particle lifetime in seconds.
    pub lifetime: f32,
    /// Size at birth.
    pub size_start: f32,
    /// Size at death.
    pub size_end: f32,
    /// Gravity weight at birth.
    pub weight_start: f32,
    /// Gravity weight at death.
    pub weight_end: f32,
    /// Seconds of emission accumulated by the simulation step.
    pub time_accumulator: f32,
    /// Bindless texture index, or [`INVALID_INDEX`].
    pub texture_index: u32,
    /// Scene node index providing the emitter transform.
    pub node_index: u32,
    /// Nonzero when the renderer may trust this slot.
    pub visible: u32,
    /// Local-space bounding box, min corner.
    pub bounds_min: [f32; 3],
    /// Padding for alignment.
    pub _pad0: f32,
    /// Local-space bounding box, max corner.
    pub bounds_max: [f32; 3],
    /// Padding for alignment.
    pub _pad1: f32,
}

impl GpuRecord for EmitterRecord {
    const NAME: &'static str = "emitters";
}

/// Falloff shape of a force field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ForceFieldKind {
    /// Radial push (positive strength) or pull from the field position.
    #[default]
    Point = 0,
    /// Constant push along `direction`, like wind.
    Directional = 1,
    /// Swirl around `direction` through the field position.
    Vortex = 2,
}

/// Per-field data consumed by the particle update pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ForceFieldRecord {
    /// Field origin, local to its node.
    pub position: [f32; 3],
    /// Signed strength.
    pub strength: f32,
    /// Axis for directional and vortex fields.
    pub direction: [f32; 3],
    /// Radius of influence.
    pub radius: f32,
    /// [`ForceFieldKind`] discriminant.
    pub kind: u32,
    /// Falloff exponent over the radius.
    pub falloff: f32,
    /// Scene node index providing the field transform.
    pub node_index: u32,
    /// Nonzero when the update pass should apply this field.
    pub enabled: u32,
}

impl GpuRecord for ForceFieldRecord {
    const NAME: &'static str = "force_fields";
}
