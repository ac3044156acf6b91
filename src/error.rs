//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Missing keys are not
//! errors: lookups report absence through `Option` and `bool`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Construction or resize parameters are invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No tokio runtime is available to drive expiry timers
    #[error("No tokio runtime available to schedule expiry timers")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
