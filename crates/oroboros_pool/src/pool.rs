//! # Slot Pool
//!
//! Fixed-capacity generational arena for resources that are frequently
//! created and destroyed.
//!
//! Each slot carries a generation counter. Freeing a slot bumps it, so every
//! handle issued before the free is rejected from then on, even after the
//! index is handed out again.

use crate::{Handle, PoolError, PoolResult};

/// One storage cell of a pool.
#[derive(Debug)]
struct Slot<T> {
    /// The live value, `None` while the slot is free or retired.
    value: Option<T>,
    /// Current generation of this slot.
    generation: u32,
}

/// A fixed-capacity pool of `T` addressed by generational handles.
///
/// Free indices are kept on a stack: allocation reuses the most recently
/// freed slot first, which keeps hot slots hot.
///
/// # Generation exhaustion
///
/// A slot freed while its generation is `u32::MAX` is retired instead of
/// wrapping back to zero. It is never reused, so a generation value is never
/// issued twice for the same index and an old handle can never be resurrected.
/// This costs one slot of capacity per 2^32 reuses of that slot.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap in a mutex.
///
/// # Example
///
/// ```rust
/// use oroboros_pool::SlotPool;
///
/// #[derive(Default)]
/// struct Particle { life: f32 }
///
/// let mut pool: SlotPool<Particle> = SlotPool::new(10_000);
///
/// // Allocate - O(1), no heap allocation
/// let (handle, particle) = pool.allocate().unwrap();
/// particle.life = 1.0;
///
/// // Free - O(1), no heap deallocation
/// assert!(pool.free(handle));
/// assert!(!pool.free(handle));
/// ```
#[derive(Debug)]
pub struct SlotPool<T> {
    /// The storage array.
    slots: Box<[Slot<T>]>,
    /// Stack of free indices, most recently freed on top.
    free_list: Vec<u32>,
    /// Number of live slots.
    live_count: usize,
    /// Number of slots retired after generation exhaustion.
    retired_count: usize,
}

impl<T> SlotPool<T> {
    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of live objects (1 to `u32::MAX`)
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit a `u32` index.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity must fit a u32 index"
        );

        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                value: None,
                generation: 0,
            })
            .collect();

        // Reversed so that a fresh pool hands out 0, 1, 2, ...
        let free_list: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots: slots.into_boxed_slice(),
            free_list,
            live_count: 0,
            retired_count: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live slots.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.live_count
    }

    /// Returns the number of slots available for allocation.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Returns the number of slots retired after generation exhaustion.
    #[inline]
    #[must_use]
    pub const fn retired_count(&self) -> usize {
        self.retired_count
    }

    /// Returns true if no slot is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Returns true if the next allocation would fail.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Allocates a slot and stores `value` in it.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AllocationFailed`] if every slot is live. The pool
    /// is left untouched in that case.
    pub fn allocate_with(&mut self, value: T) -> PoolResult<Handle<T>> {
        let (handle, _) = self.occupy(value)?;
        Ok(handle)
    }

    /// Allocates a default-initialized slot.
    ///
    /// Returns the handle together with a reference into the slot so the
    /// caller can initialize it in place.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::AllocationFailed`] if every slot is live.
    pub fn allocate(&mut self) -> PoolResult<(Handle<T>, &mut T)>
    where
        T: Default,
    {
        self.occupy(T::default())
    }

    /// Frees the slot referenced by `handle`.
    ///
    /// Returns false, without touching the pool, if the handle is out of
    /// range, already freed, or stale.
    pub fn free(&mut self, handle: Handle<T>) -> bool {
        self.remove(handle).is_some()
    }

    /// Frees the slot referenced by `handle` and returns its value.
    ///
    /// Same validation as [`SlotPool::free`].
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = self.resolve(handle)?;
        self.release(index)
    }

    /// Checks whether `handle` refers to a live slot.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.resolve(handle).is_some()
    }

    /// Gets a reference to a live object.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] for out-of-range, free, or stale handles.
    #[inline]
    pub fn get(&self, handle: Handle<T>) -> PoolResult<&T> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_ref())
            .ok_or(PoolError::invalid_handle(handle))
    }

    /// Gets a mutable reference to a live object.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidHandle`] for out-of-range, free, or stale handles.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> PoolResult<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.value.as_mut())
            .ok_or(PoolError::invalid_handle(handle))
    }

    /// Frees every live slot.
    ///
    /// Generations are bumped as for individual frees, so every handle issued
    /// so far becomes invalid.
    pub fn clear(&mut self) {
        // Descending so index 0 ends on top of the free stack.
        for index in (0..self.slots.len()).rev() {
            if self.slots[index].value.is_some() {
                let _ = self.release(index);
            }
        }
    }

    /// Iterates over all live objects.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::from_raw_parts(index as u32, slot.generation), value))
        })
    }

    /// Iterates mutably over all live objects.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (Handle::from_raw_parts(index as u32, generation), value))
        })
    }

    fn occupy(&mut self, value: T) -> PoolResult<(Handle<T>, &mut T)> {
        let Some(index) = self.free_list.pop() else {
            return Err(PoolError::AllocationFailed {
                capacity: self.slots.len(),
            });
        };

        self.live_count += 1;
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "free list held a live slot");

        let handle = Handle::from_raw_parts(index, slot.generation);
        Ok((handle, slot.value.insert(value)))
    }

    /// Returns the storage index if `handle` refers to a live slot.
    fn resolve(&self, handle: Handle<T>) -> Option<usize> {
        let index = handle.index() as usize;
        let slot = self.slots.get(index)?;
        (slot.value.is_some() && slot.generation == handle.generation()).then_some(index)
    }

    fn release(&mut self, index: usize) -> Option<T> {
        let slot = &mut self.slots[index];
        let value = slot.value.take()?;
        self.live_count -= 1;

        if slot.generation == u32::MAX {
            self.retired_count += 1;
            tracing::warn!(index, "slot generation exhausted, retiring slot");
        } else {
            slot.generation += 1;
            self.free_list.push(index as u32);
        }

        Some(value)
    }
}

#[cfg(test)]
impl<T> SlotPool<T> {
    /// Forces a slot's generation, for exercising exhaustion.
    fn set_generation(&mut self, index: usize, generation: u32) {
        self.slots[index].generation = generation;
    }
}
