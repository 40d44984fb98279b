//! # Scene Nodes
//!
//! Nodes are the transform anchors other resources point at. This layer
//! only tracks their lifetime, packed flags, and the indices the renderer
//! needs; hierarchy and traversal live in the scene graph.

use oroboros_pool::{Handle, SlotPool};

use crate::ResourceResult;

/// Default maximum live nodes
pub const MAX_NODES: u32 = 4096;

bitflags::bitflags! {
    /// Packed per-node flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct NodeFlags: u32 {
        /// Node is drawn.
        const VISIBLE = 1 << 0;
        /// Node casts shadows.
        const CASTS_SHADOW = 1 << 1;
        /// Node is skinned; `bone_offset` is meaningful.
        const SKINNED = 1 << 2;
        /// Node never moves.
        const STATIC = 1 << 3;
    }
}

/// A scene node as seen by the resource layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Node {
    /// Packed flags.
    pub flags: NodeFlags,
    /// Mesh to draw.
    pub mesh_index: u32,
    /// Material to draw with.
    pub material_index: u32,
    /// First bone in the skinning palette.
    pub bone_offset: u32,
}

/// Owns node slots.
///
/// Other resources hold `Handle<Node>` weakly. Destroying a node does not
/// touch them; [`NodeManager::is_alive`] is the liveness query for callers
/// that care.
#[derive(Debug)]
pub struct NodeManager {
    pool: SlotPool<Node>,
}

impl NodeManager {
    /// Creates a manager for `capacity` nodes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            pool: SlotPool::new(capacity as usize),
        }
    }

    /// Creates a node.
    ///
    /// # Errors
    ///
    /// `AllocationFailed` when every slot is live.
    pub fn create(&mut self, node: Node) -> ResourceResult<Handle<Node>> {
        let handle = self.pool.allocate_with(node)?;
        tracing::debug!(?handle, "node created");
        Ok(handle)
    }

    /// Destroys a node. Returns false for invalid handles.
    pub fn destroy(&mut self, handle: Handle<Node>) -> bool {
        let destroyed = self.pool.free(handle);
        if destroyed {
            tracing::debug!(?handle, "node destroyed");
        }
        destroyed
    }

    /// Gets a node.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get(&self, handle: Handle<Node>) -> ResourceResult<&Node> {
        Ok(self.pool.get(handle)?)
    }

    /// Gets a node for in-place edits.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn get_mut(&mut self, handle: Handle<Node>) -> ResourceResult<&mut Node> {
        Ok(self.pool.get_mut(handle)?)
    }

    /// Replaces a node's flags.
    ///
    /// # Errors
    ///
    /// `InvalidHandle` for stale or freed handles.
    pub fn set_flags(&mut self, handle: Handle<Node>, flags: NodeFlags) -> ResourceResult<()> {
        self.pool.get_mut(handle)?.flags = flags;
        Ok(())
    }

    /// Checks whether `handle` still refers to a live node.
    #[must_use]
    pub fn is_alive(&self, handle: Handle<Node>) -> bool {
        self.pool.contains(handle)
    }

    /// Index the renderer uses for this node.
    ///
    /// No liveness check: a stale handle yields the index it was issued for.
    #[inline]
    #[must_use]
    pub const fn gpu_index(handle: Handle<Node>) -> u32 {
        handle.index()
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.pool.count()
    }

    /// Maximum number of nodes.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        // The pool was built from a u32 capacity
        self.pool.capacity() as u32
    }

    /// Iterates over live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<Node>, &Node)> {
        self.pool.iter()
    }
}
