//! Error types for the hypercache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a cache or policy is constructed with
//!   invalid parameters (zero capacity, zero sample size, zero minimum age).
//! - [`InvariantError`]: Returned when the entry map and the eviction policy's
//!   index disagree. These are integration bugs, so the failing operation is
//!   aborted and the error is handed back to the caller.
//!
//! A lookup miss is not an error: `get`, `peek` and `remove` report absence
//! through `Option::None`.
//!
//! ## Example Usage
//!
//! ```
//! use hypercache::builder::{CacheBuilder, CachePolicy};
//! use hypercache::error::ConfigError;
//!
//! let ok = CacheBuilder::new(16).build::<u64, String>(CachePolicy::Lfu);
//! assert!(ok.is_ok());
//!
//! let err: ConfigError = CacheBuilder::new(0)
//!     .build::<u64, String>(CachePolicy::Lfu)
//!     .unwrap_err();
//! assert!(err.message().contains("capacity"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the eviction hooks when a key is missing from (or duplicated
/// in) a policy index, by eviction on an empty index, and by
/// [`Cache::check_invariants`](crate::cache::Cache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache invariant violated: {}", self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Only construction can fail with this error; a cache that was built
/// successfully never reports a `ConfigError` afterwards.
///
/// # Example
///
/// ```
/// use hypercache::builder::{CacheBuilder, CachePolicy};
///
/// let err = CacheBuilder::new(8)
///     .build::<u64, u64>(CachePolicy::Hyperbolic { sample_size: 0 })
///     .unwrap_err();
/// assert!(err.to_string().contains("sample_size"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cache configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_prefixes_message() {
        let err = InvariantError::new("key missing from sample index");
        assert_eq!(
            err.to_string(),
            "cache invariant violated: key missing from sample index"
        );
    }

    #[test]
    fn invariant_message_accessor_is_raw() {
        let err = InvariantError::new("empty policy");
        assert_eq!(err.message(), "empty policy");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_prefixes_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(
            err.to_string(),
            "invalid cache configuration: capacity must be > 0"
        );
    }

    #[test]
    fn config_message_accessor_is_raw() {
        let err = ConfigError::new("sample_size must be > 0");
        assert_eq!(err.message(), "sample_size must be > 0");
    }

    #[test]
    fn both_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
