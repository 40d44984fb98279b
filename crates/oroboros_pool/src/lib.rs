//! # OROBOROS Pool
//!
//! Generational slot pools for engine resources:
//! - O(1) allocate and free, no heap allocation after construction
//! - Stable indices that map one-to-one onto GPU buffer slots
//! - Stale handles are detected, never resolved to a reused slot
//!
//! ## Example
//!
//! ```rust
//! use oroboros_pool::SlotPool;
//!
//! let mut pool: SlotPool<u32> = SlotPool::new(8);
//! let handle = pool.allocate_with(42).unwrap();
//! assert_eq!(*pool.get(handle).unwrap(), 42);
//!
//! assert!(pool.free(handle));
//! assert!(pool.get(handle).is_err());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod error;
mod handle;
mod pool;

pub use error::{PoolError, PoolResult};
pub use handle::Handle;
pub use pool::SlotPool;
