//! LRS Cache - A bounded in-memory key/value cache
//!
//! Evicts by write order (least-recently-set) through a fixed ring of write
//! slots, and optionally expires entries after a per-entry time-to-live.
//!
//! ```ignore
//! let cache = BoundedExpiringCache::new(2, Duration::ZERO)?;
//! cache.set("a", 1);
//! cache.set("b", 2);
//! cache.set("c", 3);
//! assert!(!cache.contains("a"));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub(crate) mod tasks;

pub use cache::BoundedExpiringCache;
pub use config::{CacheConfig, DEFAULT_MAX_SIZE};
pub use error::{CacheError, Result};
