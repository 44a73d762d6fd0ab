//! Sink trait for formatted log lines

use super::{error::Result, log_level::LogLevel};

/// Destination for formatted lines
///
/// Sinks receive already formatted lines; the formatter is paired with the
/// sink when it is attached to a manager.
pub trait LogSink: Send {
    fn write_line(&mut self, level: LogLevel, line: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Flush and release any OS handle; later writes fail
    fn close(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
