//! Log file path resolution
//!
//! Without an explicit directory the per-user log directory of the platform
//! is used, following the `user_log_path` conventions of `platformdirs`:
//!
//! | platform | base |
//! |---|---|
//! | macOS | `~/Library/Logs/<app>/<version>` |
//! | Windows | `%LOCALAPPDATA%\<author>\<app>\<version>\Logs` |
//! | other | `$XDG_STATE_HOME/<app>/<version>/log` (falls back to the cache dir) |
//!
//! A `logs` segment is appended to that base.

use super::error::{Result, WrapperError};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension given to every log file
pub const LOG_FILE_EXTENSION: &str = "jsonl";

/// Inputs for automatic log directory resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoDirOptions {
    pub app_name: Option<String>,
    /// Only used on Windows; defaults to `app_name`
    pub app_author: Option<String>,
    pub version: Option<String>,
    /// Append the platform's conventional `log`/`Logs` segment
    pub opinion: bool,
    /// Create the platform directory right away
    pub ensure_exists: bool,
}

impl Default for AutoDirOptions {
    fn default() -> Self {
        Self {
            app_name: None,
            app_author: None,
            version: None,
            opinion: true,
            ensure_exists: false,
        }
    }
}

impl AutoDirOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn app_author(mut self, author: impl Into<String>) -> Self {
        self.app_author = Some(author.into());
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn opinion(mut self, opinion: bool) -> Self {
        self.opinion = opinion;
        self
    }

    #[must_use]
    pub fn ensure_exists(mut self, ensure: bool) -> Self {
        self.ensure_exists = ensure;
        self
    }

    /// Platform log directory for these options, before the `logs` segment
    pub fn platform_log_dir(&self) -> Option<PathBuf> {
        let mut dir = platform_base()?;

        if cfg!(target_os = "windows") {
            if let Some(ref app) = self.app_name {
                let author = self.app_author.as_deref().unwrap_or(app);
                dir.push(author);
            }
        }
        // Version only applies when an application name is given
        if let Some(ref app) = self.app_name {
            dir.push(app);
            if let Some(ref version) = self.version {
                dir.push(version);
            }
        }
        if self.opinion {
            if cfg!(target_os = "windows") {
                dir.push("Logs");
            } else if !cfg!(target_os = "macos") {
                dir.push("log");
            }
        }
        Some(dir)
    }
}

#[cfg(target_os = "macos")]
fn platform_base() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join("Library").join("Logs"))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Option<PathBuf> {
    dirs::data_local_dir()
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_base() -> Option<PathBuf> {
    dirs::state_dir().or_else(dirs::cache_dir)
}

/// Directory the log file lives in, without touching the filesystem
pub fn resolve_log_dir(
    log_directory: Option<&Path>,
    auto: Option<&AutoDirOptions>,
) -> Result<PathBuf> {
    if let Some(dir) = log_directory {
        return Ok(dir.to_path_buf());
    }

    let default_auto = AutoDirOptions::default();
    let auto = auto.unwrap_or(&default_auto);
    let base = auto.platform_log_dir().ok_or_else(|| {
        WrapperError::config(
            "LoggerManager",
            "cannot determine the platform log directory; set log_directory explicitly",
        )
    })?;

    if auto.ensure_exists {
        create_dir(&base)?;
    }
    Ok(base.join("logs"))
}

/// `log_MM-DD-YYYY` for the given date
pub fn default_file_stem(date: NaiveDate) -> String {
    format!("log_{:02}-{:02}-{}", date.month(), date.day(), date.year())
}

/// File name with the `.jsonl` extension, defaulting to today's date
pub fn log_file_name(stem: Option<&str>) -> String {
    let stem = match stem {
        Some(stem) => stem.to_string(),
        None => default_file_stem(Local::now().date_naive()),
    };
    format!("{}.{}", stem, LOG_FILE_EXTENSION)
}

pub(crate) fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        WrapperError::io_operation(
            "create log directory",
            format!("Failed to create directory '{}'", dir.display()),
            e,
        )
    })
}

/// Resolve and create the log directory, returning the full file path
pub fn prepare_log_file(
    log_directory: Option<&Path>,
    auto: Option<&AutoDirOptions>,
    file_stem: Option<&str>,
) -> Result<PathBuf> {
    let dir = resolve_log_dir(log_directory, auto)?;
    create_dir(&dir)?;
    Ok(dir.join(log_file_name(file_stem)))
}
