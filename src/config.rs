//! Configuration Module
//!
//! Handles loading and validating cache configuration, either from
//! environment variables or from a serialized application config.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Capacity used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 500;

/// Cache configuration parameters.
///
/// A `default_ttl` of zero disables automatic expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of slots in the write ring
    pub max_size: usize,
    /// TTL applied by `set` when no explicit TTL is given
    pub default_ttl: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Ring capacity (default: 500)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, no expiry)
    pub fn from_env() -> Self {
        Self {
            max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_SIZE),
            default_ttl: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO),
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    // == Validate ==
    /// Rejects a zero capacity, which would leave the write ring without slots.
    pub fn validate(&self) -> Result<()> {
        validate_max_size(self.max_size)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl: Duration::ZERO,
        }
    }
}

pub(crate) fn validate_max_size(max_size: usize) -> Result<()> {
    if max_size == 0 {
        return Err(CacheError::InvalidConfig(
            "max_size must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
