//! Timestamp formatting utilities
//!
//! Record timestamps are taken from the local wall clock at format time.
//! The default rendering mirrors a plain local datetime with microseconds
//! (`2025-01-08 10:30:45.123456`); ISO 8601, RFC 3339, Unix milliseconds and
//! custom strftime patterns are available as well.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Timestamp format options for formatted records
///
/// # Examples
///
/// ```
/// use rust_call_wrappers::core::TimestampFormat;
///
/// let format = TimestampFormat::Local;
/// let timestamp = format.format(&chrono::Local::now());
/// // Output: "2025-01-08 10:30:45.123456"
/// assert_eq!(timestamp.len(), 26);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local datetime with microseconds: `2025-01-08 10:30:45.123456`
    #[default]
    Local,

    /// ISO 8601 with milliseconds and offset: `2025-01-08T10:30:45.123+01:00`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456+01:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_call_wrappers::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format a local datetime according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::Local => datetime.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                // Invalid patterns fall back to the default rendering
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => TimestampFormat::Local.format(datetime),
                }
            }
        }
    }

    /// Format the current local time
    #[must_use]
    pub fn now(&self) -> String {
        self.format(&Local::now())
    }
}
