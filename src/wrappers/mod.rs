//! Function wrappers: retry, memoization and timing
//!
//! Logging is provided by [`LoggerManager::log_function`](crate::core::LoggerManager::log_function).

pub mod cache;
pub mod retry;
pub mod timing;

pub use cache::{CacheLookup, CachedFn, MemoizingCache};
pub use retry::{retry, ErrorType, Retry, RetryConfig, RetryOn, Retrying};
pub use timing::{measure, timing, Timed};
