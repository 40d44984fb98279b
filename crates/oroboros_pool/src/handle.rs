//! # Handles
//!
//! A handle is a lightweight, copyable reference into a [`SlotPool`](crate::SlotPool):
//! - An index into the pool's dense storage
//! - A generation counter for detecting stale references
//!
//! Handles carry no ownership. Holding one says nothing about whether the
//! slot is still alive; the pool answers that question.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed reference to a slot in a pool of `T`.
///
/// The type parameter only tags the handle: a `Handle<Emitter>` cannot be
/// passed where a `Handle<Node>` is expected. `T` is never stored, so a
/// handle is `Copy + Send + Sync` regardless of `T`.
///
/// Packed form (see [`Handle::to_bits`]):
/// - Lower 32 bits: index
/// - Upper 32 bits: generation
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Null handle. Never issued by a pool.
    pub const NULL: Self = Self::from_raw_parts(u32::MAX, u32::MAX);

    /// Creates a handle from its raw index and generation.
    ///
    /// Pools issue handles themselves; this exists for collaborators that
    /// transport handles as plain integers.
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation the slot had when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Packs the handle into a single `u64`.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpacks a handle produced by [`Handle::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self::from_raw_parts(bits as u32, (bits >> 32) as u32)
    }

    /// Checks if this is the null handle.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u32::MAX && self.generation == u32::MAX
    }
}

// Manual impls: derives would put bounds on `T`.

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.index, self.generation).cmp(&(other.index, other.generation))
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Handle(null)");
        }
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}
