//! Cache Module
//!
//! Provides in-memory caching with least-recently-set eviction and TTL expiry.

mod ring;
mod store;


// Re-export public types
pub(crate) use ring::WriteRing;
pub use store::BoundedExpiringCache;
