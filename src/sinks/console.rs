//! Console sink implementation

use crate::core::{LogLevel, LogSink, Result, WrapperError};
use colored::Colorize;
use std::io::Write;

pub struct ConsoleSink {
    use_colors: bool,
    closed: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            closed: false,
        }
    }

    fn render(&self, level: LogLevel, line: &str) -> String {
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&mut self, level: LogLevel, line: &str) -> Result<()> {
        if self.closed {
            return Err(WrapperError::writer("Console sink is closed"));
        }

        let output = self.render(level, line);

        // Route Error level to stderr, others to stdout
        match level {
            LogLevel::Error => writeln!(std::io::stderr().lock(), "{}", output)?,
            _ => writeln!(std::io::stdout().lock(), "{}", output)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.flush()?;
            self.closed = true;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render_leaves_line_untouched() {
        let sink = ConsoleSink::with_colors(false);
        assert_eq!(sink.render(LogLevel::Error, "[ERROR|a.rs/f|1]"), "[ERROR|a.rs/f|1]");
    }

    #[test]
    fn test_console_sink_close() {
        let mut sink = ConsoleSink::with_colors(false);
        sink.write_line(LogLevel::Info, "console sink test line").unwrap();
        sink.close().unwrap();
        assert!(sink.write_line(LogLevel::Info, "late").is_err());
    }
}
