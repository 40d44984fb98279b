//! Animation clips.
//!
//! Clip content comes from an authoring collaborator and is stored as an
//! opaque payload. This layer only manages slot lifetime and lookup.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use oroboros_pool::{Handle, PoolError, SlotPool};

use crate::error::AuthoringError;
use crate::ResourceResult;

/// Default maximum live clips
pub const MAX_ANIMATION_CLIPS: u32 = 1024;

/// Authored clip content. Never interpreted here.
pub struct ClipPayload(Box<dyn Any + Send + Sync>);

impl ClipPayload {
    /// Wraps authored content.
    #[must_use]
    pub fn new<P: Any + Send + Sync>(payload: P) -> Self {
        Self(Box::new(payload))
    }

    /// Borrows the content as `P`, if that is what was stored.
    #[must_use]
    pub fn downcast_ref<P: Any>(&self) -> Option<&P> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for ClipPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClipPayload(..)")
    }
}

/// Builds clip content for a requested shape.
pub trait AnimationAuthoring: Send + Sync {
    /// Produces the payload for a clip.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthoringError`] when the clip cannot be built.
    fn author(&self, channel_count: u32, duration: f32, name: &str) -> Result<ClipPayload, AuthoringError>;
}

/// An animation clip.
#[derive(Debug)]
pub struct AnimationClip {
    name: String,
    channel_count: u32,
    duration: f32,
    payload: ClipPayload,
}

impl AnimationClip {
    /// Clip name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of animated channels.
    #[must_use]
    pub const fn channel_count(&self) -> u32 {
        self.channel_count
    }

    /// Length in seconds.
    #[must_use]
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// Authored content, stored verbatim.
    #[must_use]
    pub const fn payload(&self) -> &ClipPayload {
        &self.payload
    }
}

/// Owns clip slots and the authoring collaborator.
pub struct AnimationClipManager {
    pool: SlotPool<AnimationClip>,
    authoring: Arc<dyn AnimationAuthoring>,
}

impl AnimationClipManager {
    /// Creates a manager for `capacity` clips.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(authoring: Arc<dyn AnimationAuthoring>, capacity: u32) -> Self {
        Self {
            pool: SlotPool::new(capacity as usize),
            authoring,
        }
    }

    /// Authors and stores a clip.
    ///
    /// The pool is checked before authoring, so a full pool never invokes the
    /// collaborator. A failed authoring consumes no slot.
    ///
    /// # Errors
    ///
    /// `AllocationFailed` when every slot is live, or `Authoring`.
    pub fn create(&mut self, channel_count: u32, duration: f32, name: &str) -> ResourceResult<Handle<AnimationClip>> {
        if self.pool.is_full() {
            return Err(PoolError::AllocationFailed {
                capacity: self.pool.capacity(),
            }
            .into());
        }

        let payload = self
            .authoring
            .author(channel_count, duration, name)
            .inspect_err(|error| tracing::warn!(clip = name, %error, "clip authoring failed"))?;

        let handle = self.pool.allocate_with(AnimationClip {
            name: name.to_owned(),
            channel_count,
            duration,
            payload,
        })?;

        tracing::debug!(?handle, clip = name, channel_count, "clip created");
        Ok(handle)
    }

    /// Destroys a clip. Returns false for invalid handles.
    pub fn destroy(&mut self, handle: Handle<AnimationClip>) -> bool {
        let destroyed = self.pool.free(handle);
        if destroyed {
            tracing::debug!(?handle, "clip destroyed");
        }
        destroyed
    }

    /// Gets a clip.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get(&self, handle: Handle<AnimationClip>) -> ResourceResult<&AnimationClip> {
        Ok(self.pool.get(handle)?)
    }

    /// Finds a live clip by name. First match in slot order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<Handle<AnimationClip>> {
        self.pool
            .iter()
            .find_map(|(handle, clip)| (clip.name == name).then_some(handle))
    }

    /// Number of live clips.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Maximum number of clips.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        // The pool was built from a u32 capacity
        self.pool.capacity() as u32
    }

    /// Iterates over live clips.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<AnimationClip>, &AnimationClip)> {
        self.pool.iter()
    }
}

impl fmt::Debug for AnimationClipManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationClipManager")
            .field("count", &self.pool.count())
            .field("capacity", &self.pool.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Channels(Vec<f32>);

    #[derive(Default)]
    struct FakeAuthoring {
        calls: AtomicUsize,
    }

    impl AnimationAuthoring for FakeAuthoring {
        fn author(&self, channel_count: u32, duration: f32, name: &str) -> Result<ClipPayload, AuthoringError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if name.is_empty() {
                return Err(AuthoringError("clip needs a name".to_owned()));
            }
            Ok(ClipPayload::new(Channels(vec![duration; channel_count as usize])))
        }
    }

    fn manager(capacity: u32) -> (Arc<FakeAuthoring>, AnimationClipManager) {
        let authoring = Arc::new(FakeAuthoring::default());
        let clips = AnimationClipManager::new(authoring.clone(), capacity);
        (authoring, clips)
    }

    #[test]
    fn test_payload_stored_verbatim() {
        let (_, mut clips) = manager(4);
        let handle = clips.create(3, 1.5, "walk").unwrap();

        let clip = clips.get(handle).unwrap();
        assert_eq!(clip.name(), "walk");
        assert_eq!(clip.channel_count(), 3);
        assert_eq!(clip.duration(), 1.5);
        assert_eq!(clip.payload().downcast_ref::<Channels>(), Some(&Channels(vec![1.5; 3])));
        assert!(clip.payload().downcast_ref::<u32>().is_none());
    }

    #[test]
    fn test_authoring_failure_consumes_no_slot() {
        let (_, mut clips) = manager(1);

        let error = clips.create(2, 1.0, "").unwrap_err();
        assert!(matches!(error, crate::ResourceError::Authoring(_)));
        assert_eq!(clips.count(), 0);

        assert!(clips.create(2, 1.0, "idle").is_ok());
    }

    #[test]
    fn test_full_pool_skips_authoring() {
        let (authoring, mut clips) = manager(1);
        clips.create(1, 1.0, "idle").unwrap();

        assert!(clips.create(1, 1.0, "run").unwrap_err().is_capacity());
        assert_eq!(authoring.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_find_by_name() {
        let (_, mut clips) = manager(4);
        let idle = clips.create(1, 1.0, "idle").unwrap();
        let run = clips.create(1, 0.5, "run").unwrap();

        assert_eq!(clips.find_by_name("run"), Some(run));
        assert!(clips.destroy(run));
        assert_eq!(clips.find_by_name("run"), None);
        assert_eq!(clips.find_by_name("idle"), Some(idle));
    }
}
