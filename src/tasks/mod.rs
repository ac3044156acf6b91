//! Background Tasks Module
//!
//! Contains the deferred tasks that run alongside the cache.
//!
//! # Tasks
//! - TTL Expiry: Removes a single entry once its time-to-live has elapsed

mod expiry;

pub(crate) use expiry::{spawn_expiry, ExpiryTimer};
