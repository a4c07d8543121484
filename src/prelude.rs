pub use crate::builder::{CacheBuilder, CachePolicy};
pub use crate::cache::Cache;
pub use crate::clock::{Clock, ManualClock, SystemClock, Timestamp};
#[cfg(feature = "concurrency")]
pub use crate::concurrent::ConcurrentCache;
pub use crate::entry::EntryMeta;
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::CacheMetricsSnapshot;
pub use crate::policy::Policy;
pub use crate::policy::hyperbolic::{HyperbolicConfig, HyperbolicPolicy, Priority};
pub use crate::policy::lfu::LfuPolicy;
pub use crate::traits::EvictionPolicy;
