//! Logging macros for formatted messages.
//!
//! These macros forward to [`LoggerManager::log_message`] with a `format!`ed
//! message. The record is attributed to the line the macro is invoked on.
//!
//! [`LoggerManager::log_message`]: crate::core::LoggerManager::log_message
//!
//! # Examples
//!
//! ```
//! use rust_call_wrappers::prelude::*;
//! use rust_call_wrappers::info;
//!
//! let manager = LoggerManager::new();
//!
//! // Basic logging
//! info!(manager, "Server started").unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(manager, "Server listening on port {}", port).unwrap();
//! ```

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_call_wrappers::prelude::*;
/// # let manager = LoggerManager::new();
/// use rust_call_wrappers::log;
/// log!(manager, LogLevel::Info, "Simple message").unwrap();
/// log!(manager, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($manager:expr, $level:expr, $($arg:tt)+) => {
        $manager.log_message($level, format!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($manager:expr, $($arg:tt)+) => {
        $crate::log!($manager, $crate::core::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_call_wrappers::prelude::*;
/// # let manager = LoggerManager::new();
/// use rust_call_wrappers::info;
/// info!(manager, "Processing {} items", 100).unwrap();
/// ```
#[macro_export]
macro_rules! info {
    ($manager:expr, $($arg:tt)+) => {
        $crate::log!($manager, $crate::core::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($manager:expr, $($arg:tt)+) => {
        $crate::log!($manager, $crate::core::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($manager:expr, $($arg:tt)+) => {
        $crate::log!($manager, $crate::core::LogLevel::Error, $($arg)+)
    };
}

/// The [`CallSite`](crate::core::CallSite) of the macro invocation.
///
/// Useful with the `*_at` methods when a record should point somewhere other
/// than the immediate caller.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::core::CallSite::new(file!(), line!())
    };
}
