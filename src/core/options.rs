//! Logger manager configuration

use super::error::{Result, WrapperError};
use super::formatter::RecordFormatter;
use super::log_level::LogLevel;
use super::paths::AutoDirOptions;
use super::timestamp::TimestampFormat;
use crate::sinks::rotating_file::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_BYTES};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Options applied by [`LoggerManager::initialize`](super::LoggerManager::initialize)
///
/// Built with the `with_*`/setter methods or deserialized from JSON; every
/// field is optional. The custom formatter can only be set from code.
///
/// # Examples
///
/// ```
/// use rust_call_wrappers::core::LoggerOptions;
///
/// let options = LoggerOptions::new()
///     .log_to_terminal(true)
///     .log_file_name("service")
///     .use_rotation(true)
///     .max_bytes_before_rotate(512 * 1024);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LoggerOptions {
    pub log_to_terminal: bool,
    pub log_to_file: bool,
    /// File name without extension; `None` uses `log_MM-DD-YYYY`
    pub log_file_name: Option<String>,
    pub log_as_json: bool,
    pub use_rotation: bool,
    /// `None` means the 1 MiB default
    pub max_bytes_before_rotate: Option<u64>,
    /// `None` means the default of 3 backups
    pub backup_file_count: Option<usize>,
    #[serde(skip)]
    pub custom_formatter: Option<Arc<dyn RecordFormatter>>,
    pub log_directory: Option<PathBuf>,
    pub auto_directory_options: Option<AutoDirOptions>,
    /// Records below this level are not written
    pub min_level: LogLevel,
    pub timestamp_format: TimestampFormat,
    pub console_colors: bool,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            log_to_terminal: false,
            log_to_file: true,
            log_file_name: None,
            log_as_json: true,
            use_rotation: false,
            max_bytes_before_rotate: None,
            backup_file_count: None,
            custom_formatter: None,
            log_directory: None,
            auto_directory_options: None,
            min_level: LogLevel::Debug,
            timestamp_format: TimestampFormat::default(),
            console_colors: true,
        }
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("log_to_terminal", &self.log_to_terminal)
            .field("log_to_file", &self.log_to_file)
            .field("log_file_name", &self.log_file_name)
            .field("log_as_json", &self.log_as_json)
            .field("use_rotation", &self.use_rotation)
            .field("max_bytes_before_rotate", &self.max_bytes_before_rotate)
            .field("backup_file_count", &self.backup_file_count)
            .field(
                "custom_formatter",
                &self.custom_formatter.as_ref().map(|f| f.name().to_string()),
            )
            .field("log_directory", &self.log_directory)
            .field("auto_directory_options", &self.auto_directory_options)
            .field("min_level", &self.min_level)
            .field("timestamp_format", &self.timestamp_format)
            .field("console_colors", &self.console_colors)
            .finish()
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn log_to_terminal(mut self, enabled: bool) -> Self {
        self.log_to_terminal = enabled;
        self
    }

    #[must_use]
    pub fn log_to_file(mut self, enabled: bool) -> Self {
        self.log_to_file = enabled;
        self
    }

    #[must_use]
    pub fn log_file_name(mut self, name: impl Into<String>) -> Self {
        self.log_file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn log_as_json(mut self, enabled: bool) -> Self {
        self.log_as_json = enabled;
        self
    }

    #[must_use]
    pub fn use_rotation(mut self, enabled: bool) -> Self {
        self.use_rotation = enabled;
        self
    }

    #[must_use]
    pub fn max_bytes_before_rotate(mut self, max_bytes: u64) -> Self {
        self.max_bytes_before_rotate = Some(max_bytes);
        self
    }

    #[must_use]
    pub fn backup_file_count(mut self, count: usize) -> Self {
        self.backup_file_count = Some(count);
        self
    }

    #[must_use]
    pub fn custom_formatter(mut self, formatter: impl RecordFormatter + 'static) -> Self {
        self.custom_formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use]
    pub fn log_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn auto_directory_options(mut self, options: AutoDirOptions) -> Self {
        self.auto_directory_options = Some(options);
        self
    }

    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn console_colors(mut self, enabled: bool) -> Self {
        self.console_colors = enabled;
        self
    }

    /// Effective rotation threshold
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes_before_rotate.unwrap_or(DEFAULT_MAX_BYTES)
    }

    /// Effective number of rotated backups
    pub fn backup_count(&self) -> usize {
        self.backup_file_count.unwrap_or(DEFAULT_BACKUP_COUNT)
    }

    /// Check option combinations without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        if !self.use_rotation
            && (self.max_bytes() != DEFAULT_MAX_BYTES || self.backup_count() != DEFAULT_BACKUP_COUNT)
        {
            return Err(WrapperError::config(
                "LoggerManager",
                "max_bytes_before_rotate and backup_file_count require use_rotation",
            ));
        }
        if self.log_directory.is_some() && self.auto_directory_options.is_some() {
            return Err(WrapperError::config(
                "LoggerManager",
                "auto_directory_options cannot be combined with log_directory",
            ));
        }
        if self.use_rotation && self.max_bytes() == 0 {
            return Err(WrapperError::config(
                "LoggerManager",
                "max_bytes_before_rotate must be greater than zero",
            ));
        }
        Ok(())
    }
}
