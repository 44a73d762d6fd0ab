//! # Rust Call Wrappers
//!
//! Wrappers that observe function calls without changing what they return:
//! structured execution logging to JSON-lines files, retry on failure,
//! memoization and timing.
//!
//! ## Features
//!
//! - **Execution logging**: every call of a wrapped function becomes one JSON
//!   line with its arguments, return value or error, file and line
//! - **Rotation**: size-bounded log files with numbered backups
//! - **Retry**: bounded attempts with a fixed delay, filtered by error type
//! - **Memoization**: results keyed by function name and arguments
//! - **Timing**: wall-clock reports through `tracing`
//!
//! ## Example
//!
//! ```no_run
//! use rust_call_wrappers::prelude::*;
//!
//! let manager = LoggerManager::new();
//! manager
//!     .initialize(LoggerOptions::new().log_directory("logs").log_file_name("app"))
//!     .unwrap();
//!
//! let add = manager.log_function(LogFunctionOptions::new(), "add", |(a, b): (i32, i32)| {
//!     Ok::<_, std::num::ParseIntError>(a + b)
//! });
//! assert_eq!(add.call((1, 2)).unwrap(), Some(3));
//! manager.log_info("done").unwrap();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;
pub mod wrappers;

pub mod prelude {
    pub use crate::core::{
        kwargs_only, AutoDirOptions, CallArgs, CallError, CallSite, ExecutionRecord,
        JsonLineFormatter, LogFunctionOptions, LogLevel, LogSink, LoggedFn, LoggerManager,
        LoggerOptions, RecordFormatter, Result, TextFormatter, TimestampFormat, WithKwargs,
        WrapperError,
    };
    pub use crate::wrappers::{
        measure, retry, timing, CacheLookup, ErrorType, MemoizingCache, Retry, RetryConfig,
        RetryOn,
    };
}

pub use crate::core::{
    kwargs_only, CallArgs, CallError, CallSite, ExecutionRecord, LogFunctionOptions, LogLevel,
    LoggedFn, LoggerManager, LoggerOptions, Result, WithKwargs, WrapperError,
};
pub use crate::sinks::{ConsoleSink, FileSink, RotatingFileSink, RotationPolicy};
pub use crate::wrappers::{measure, retry, timing, MemoizingCache, Retry, RetryConfig, RetryOn};
