//! Plain file sink

use crate::core::{LogLevel, LogSink, Result, WrapperError};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one line per record to a file
///
/// Each line is flushed as soon as it is written so the file can be read
/// back while the sink is still attached.
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                WrapperError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl LogSink for FileSink {
    fn write_line(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| WrapperError::writer("File sink is closed"))?;

        writeln!(writer, "{}", line).map_err(|e| {
            WrapperError::file_sink(
                self.path.display().to_string(),
                format!("Failed to write log line: {}", e),
            )
        })?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            // Writer is dropped here, releasing the file handle
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_appends_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("plain.jsonl");

        let mut sink = FileSink::new(&path)?;
        sink.write_line(LogLevel::Info, "first")?;
        sink.write_line(LogLevel::Debug, "second")?;

        // Readable without closing
        let content = fs::read_to_string(&path)?;
        assert_eq!(content, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn test_file_sink_appends_to_existing_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("existing.jsonl");
        fs::write(&path, "old\n")?;

        let mut sink = FileSink::new(&path)?;
        sink.write_line(LogLevel::Info, "new")?;
        sink.close()?;

        assert_eq!(fs::read_to_string(&path)?, "old\nnew\n");
        Ok(())
    }

    #[test]
    fn test_closed_sink_rejects_writes() -> Result<()> {
        let dir = tempdir()?;
        let mut sink = FileSink::new(dir.path().join("closed.jsonl"))?;
        sink.close()?;

        assert!(sink.is_closed());
        assert!(matches!(
            sink.write_line(LogLevel::Info, "late"),
            Err(WrapperError::Writer(_))
        ));
        // Closing twice is fine
        sink.close()?;
        Ok(())
    }
}
