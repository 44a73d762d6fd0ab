//! Core record, sink and manager types

pub mod call_args;
pub mod error;
pub mod formatter;
pub mod log_level;
pub mod manager;
pub mod options;
pub mod paths;
pub mod record;
pub mod sink;
pub mod timestamp;

pub use call_args::{kwargs_only, CallArgs, CapturedArgs, WithKwargs};
pub use error::{CallError, Result, WrapperError};
pub use formatter::{JsonLineFormatter, RecordFormatter, TextFormatter};
pub use log_level::LogLevel;
pub use manager::{LogFunctionOptions, LoggedFn, LoggerManager};
pub use options::LoggerOptions;
pub use paths::AutoDirOptions;
pub use record::{CallSite, ExecutionRecord, NON_FUNCTION_LOG};
pub use sink::LogSink;
pub use timestamp::TimestampFormat;
