//! hypercache: a fixed-capacity in-memory cache with hyperbolic and LFU
//! eviction.
//!
//! See `DESIGN.md` for the architecture and the decisions behind it.

pub mod builder;
pub mod cache;
pub mod clock;
#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod ds;
pub mod entry;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod policy;
pub mod prelude;
pub mod traits;
