//! Size-bounded rotating file sink
//!
//! Before each write the sink checks whether the line would push the current
//! file past `max_bytes`. If so the file is rotated: the oldest backup is
//! removed, `<file>.N` becomes `<file>.N+1`, the current file becomes
//! `<file>.1` and a fresh file is opened.

use crate::core::{LogLevel, LogSink, Result, WrapperError};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default size threshold (1 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;

/// Default number of rotated files kept next to the live file
pub const DEFAULT_BACKUP_COUNT: usize = 3;

/// Rotation limits
///
/// # Examples
///
/// ```
/// use rust_call_wrappers::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_bytes(64 * 1024)
///     .with_backup_count(5);
/// assert_eq!(policy.backup_count, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write that would take the file past this size
    pub max_bytes: u64,
    /// Rotated generations to keep; 0 discards the old file on rotation
    pub backup_count: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }
}

pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    closed: bool,
}

impl RotatingFileSink {
    /// Create a rotating sink with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// Create a rotating sink with a custom policy
    ///
    /// # Errors
    ///
    /// Returns error if `max_bytes` is zero or the file cannot be opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        if policy.max_bytes == 0 {
            return Err(WrapperError::config(
                "RotatingFileSink",
                "max_bytes must be greater than zero",
            ));
        }

        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    WrapperError::io_operation(
                        "create log directory",
                        format!("Failed to create directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let (file, current_size) = Self::open(&base_path)?;

        Ok(Self {
            base_path,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            closed: false,
        })
    }

    fn open(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                WrapperError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                WrapperError::file_sink(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    fn should_rotate(&self, next_len: u64) -> bool {
        self.current_size > 0 && self.current_size + next_len > self.policy.max_bytes
    }

    /// Perform log rotation
    fn rotate(&mut self) -> Result<()> {
        // Explicitly drop writer to release file handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                WrapperError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.policy.backup_count == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    WrapperError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to discard full log file: {}", e),
                    )
                })?;
            }
        } else {
            let oldest = self.backup_path(self.policy.backup_count);
            if oldest.exists() {
                if let Err(e) = fs::remove_file(&oldest) {
                    eprintln!(
                        "[WARN] Failed to remove oldest backup {}: {}",
                        oldest.display(),
                        e
                    );
                }
            }

            for i in (1..self.policy.backup_count).rev() {
                let old_path = self.backup_path(i);
                if !old_path.exists() {
                    continue;
                }
                let new_path = self.backup_path(i + 1);
                if let Err(first) = fs::rename(&old_path, &new_path) {
                    // On some platforms, rename fails if destination exists
                    if new_path.exists() {
                        let _ = fs::remove_file(&new_path);
                    }
                    fs::rename(&old_path, &new_path).map_err(|e| {
                        WrapperError::file_rotation(
                            old_path.display().to_string(),
                            format!("Failed to rotate backup files: {} ({})", e, first),
                        )
                    })?;
                }
            }

            if self.base_path.exists() {
                fs::rename(&self.base_path, self.backup_path(1)).map_err(|e| {
                    WrapperError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to rotate current log file: {}", e),
                    )
                })?;
            }
        }

        let (file, size) = Self::open(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        Ok(())
    }

    /// Backup file path for the given generation
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut path = self.base_path.clone();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("log.jsonl")
            .to_string();
        path.set_file_name(format!("{}.{}", filename, index));
        path
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl LogSink for RotatingFileSink {
    fn write_line(&mut self, _level: LogLevel, line: &str) -> Result<()> {
        if self.closed {
            return Err(WrapperError::writer("Rotating file sink is closed"));
        }

        let formatted = format!("{}\n", line);
        let bytes = formatted.len() as u64;

        if self.should_rotate(bytes) {
            if let Err(e) = self.rotate() {
                // Keep logging into the current file rather than losing records
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);
                if self.writer.is_none() {
                    let (file, size) = Self::open(&self.base_path)?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                }
                // Allow the file to grow past the limit instead of retrying every write
                self.current_size = 0;
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| WrapperError::writer("Writer not initialized"))?;
        writer.write_all(formatted.as_bytes()).map_err(|e| {
            WrapperError::file_sink(
                self.base_path.display().to_string(),
                format!("Failed to write log line: {}", e),
            )
        })?;
        writer.flush()?;
        self.current_size += bytes;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                WrapperError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
