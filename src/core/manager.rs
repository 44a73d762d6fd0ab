//! Logger manager: owns sinks and emits execution records
//!
//! A manager starts with no sinks. [`LoggerManager::initialize`] validates a
//! set of [`LoggerOptions`], closes whatever sinks were attached before and
//! attaches the file and/or console sinks the options ask for. Records are
//! produced by [`LoggerManager::log_info`] and by functions wrapped with
//! [`LoggerManager::log_function`].
//!
//! Every manager is independent; there is no process-wide logger. Sinks are
//! closed on [`LoggerManager::clear`], [`LoggerManager::shutdown`] and when
//! the manager is dropped, which releases the log file handle.

use super::{
    call_args::CallArgs,
    error::{CallError, Result, WrapperError},
    formatter::{JsonLineFormatter, RecordFormatter, TextFormatter},
    log_level::LogLevel,
    options::LoggerOptions,
    paths,
    record::{describe_error, render_returned, short_type_name, CallSite, ExecutionRecord},
    sink::LogSink,
};
use crate::sinks::{ConsoleSink, FileSink, RotatingFileSink, RotationPolicy};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A sink together with the formatter assigned when it was attached
struct AttachedSink {
    sink: Box<dyn LogSink>,
    formatter: Arc<dyn RecordFormatter>,
}

#[derive(Default)]
struct ManagerState {
    sinks: Vec<AttachedSink>,
    options: Option<LoggerOptions>,
    log_file_path: Option<PathBuf>,
    min_level: LogLevel,
}

/// Owns a set of sinks and writes execution records to all of them
///
/// Each manager is configured independently; a fresh one has no sinks and
/// drops every record.
///
/// ```
/// use rust_call_wrappers::LoggerManager;
///
/// let manager = LoggerManager::new();
/// assert_eq!(manager.sink_count(), 0);
/// manager.log_info("dropped").unwrap();
/// ```
pub struct LoggerManager {
    state: Mutex<ManagerState>,
}

impl LoggerManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManagerState::default()),
        }
    }

    /// Apply `options`, replacing every attached sink
    ///
    /// Options are validated before anything else happens, so a rejected
    /// configuration leaves the current sinks and the filesystem untouched.
    /// Returns the resolved log file path.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for contradictory options; IO errors when the
    /// directory or file cannot be created.
    pub fn initialize(&self, options: LoggerOptions) -> Result<PathBuf> {
        options.validate()?;

        let mut state = self.state.lock();
        // Old handles must be released before the same path is reopened
        let closed = Self::close_all(&mut state.sinks);
        if let Err(e) = closed {
            eprintln!("[WARN] Failed to close previous sink: {}", e);
        }
        state.log_file_path = None;
        state.options = None;

        let path = paths::prepare_log_file(
            options.log_directory.as_deref(),
            options.auto_directory_options.as_ref(),
            options.log_file_name.as_deref(),
        )?;

        let mut sinks = Vec::new();

        if options.log_to_file {
            let sink: Box<dyn LogSink> = if options.use_rotation {
                let policy = RotationPolicy::new()
                    .with_max_bytes(options.max_bytes())
                    .with_backup_count(options.backup_count());
                Box::new(RotatingFileSink::with_policy(&path, policy)?)
            } else {
                Box::new(FileSink::new(&path)?)
            };

            let formatter: Arc<dyn RecordFormatter> = match options.custom_formatter {
                Some(ref custom) => Arc::clone(custom),
                None if options.log_as_json => Arc::new(
                    JsonLineFormatter::new().with_timestamp_format(options.timestamp_format.clone()),
                ),
                None => Arc::new(
                    TextFormatter::new().with_timestamp_format(options.timestamp_format.clone()),
                ),
            };
            sinks.push(AttachedSink { sink, formatter });
        }

        if options.log_to_terminal {
            let formatter: Arc<dyn RecordFormatter> = match options.custom_formatter {
                Some(ref custom) => Arc::clone(custom),
                None => Arc::new(
                    TextFormatter::new().with_timestamp_format(options.timestamp_format.clone()),
                ),
            };
            sinks.push(AttachedSink {
                sink: Box::new(ConsoleSink::with_colors(options.console_colors)),
                formatter,
            });
        }

        state.sinks = sinks;
        state.min_level = options.min_level;
        state.log_file_path = Some(path.clone());
        state.options = Some(options);
        Ok(path)
    }

    /// Log an informational message attributed to the caller
    #[track_caller]
    pub fn log_info(&self, message: impl Into<String>) -> Result<()> {
        self.log_message_at(CallSite::caller(), LogLevel::Info, message)
    }

    /// Log an informational message with an explicit call site
    pub fn log_info_at(&self, site: CallSite, message: impl Into<String>) -> Result<()> {
        self.log_message_at(site, LogLevel::Info, message)
    }

    /// Log a message at any level, attributed to the caller
    #[track_caller]
    pub fn log_message(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        self.log_message_at(CallSite::caller(), level, message)
    }

    pub fn log_message_at(
        &self,
        site: CallSite,
        level: LogLevel,
        message: impl Into<String>,
    ) -> Result<()> {
        let record = ExecutionRecord::message(level, &site, message);
        self.emit(&record)
    }

    /// Wrap `func` so every call is recorded
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_call_wrappers::core::{LogFunctionOptions, LoggerManager, LoggerOptions};
    ///
    /// let manager = LoggerManager::new();
    /// manager.initialize(LoggerOptions::new().log_directory("logs")).unwrap();
    ///
    /// let add = manager.log_function(LogFunctionOptions::new(), "add", |(a, b): (i32, i32)| {
    ///     Ok::<_, std::fmt::Error>(a + b)
    /// });
    /// assert_eq!(add.call((1, 2)).unwrap(), Some(3));
    /// ```
    pub fn log_function<F>(
        &self,
        options: LogFunctionOptions,
        name: impl Into<String>,
        func: F,
    ) -> LoggedFn<'_, F> {
        LoggedFn {
            manager: self,
            name: name.into(),
            options,
            func,
        }
    }

    /// Format `record` for every attached sink and write it
    ///
    /// All sinks receive the record even if one of them fails; the first
    /// failure is returned.
    pub fn emit(&self, record: &ExecutionRecord) -> Result<()> {
        let mut state = self.state.lock();
        if record.level < state.min_level {
            return Ok(());
        }

        let mut first_error = None;
        for attached in state.sinks.iter_mut() {
            let written = attached
                .formatter
                .format(record)
                .and_then(|line| attached.sink.write_line(record.level, &line));
            if let Err(e) = written {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        for attached in state.sinks.iter_mut() {
            attached.sink.flush()?;
        }
        Ok(())
    }

    /// Close and detach every sink and forget the active options
    pub fn clear(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.log_file_path = None;
        state.options = None;
        state.min_level = LogLevel::default();
        Self::close_all(&mut state.sinks)
    }

    /// Close every sink and consume the manager
    pub fn shutdown(self) -> Result<()> {
        self.clear()
    }

    fn close_all(sinks: &mut Vec<AttachedSink>) -> Result<()> {
        let mut first_error = None;
        for mut attached in sinks.drain(..) {
            if let Err(e) = attached.sink.close() {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.state.lock().sinks.len()
    }

    /// Names of the attached sinks, in attach order
    pub fn sink_names(&self) -> Vec<String> {
        self.state
            .lock()
            .sinks
            .iter()
            .map(|attached| attached.sink.name().to_string())
            .collect()
    }

    /// Log file path resolved by the last successful `initialize`
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.state.lock().log_file_path.clone()
    }

    /// Options applied by the last successful `initialize`
    pub fn options(&self) -> Option<LoggerOptions> {
        self.state.lock().options.clone()
    }
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerManager")
            .field("sinks", &self.sink_names())
            .field("log_file_path", &self.log_file_path())
            .finish()
    }
}

impl Drop for LoggerManager {
    fn drop(&mut self) {
        // Release file handles even when shutdown() was never called
        let _ = Self::close_all(&mut self.state.get_mut().sinks);
    }
}

/// Options of [`LoggerManager::log_function`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFunctionOptions {
    /// Log the error and return `Ok(None)` instead of returning it
    pub skip_exception: bool,
    /// Annotation stored in the `info` field of every record
    pub extra_info: Option<String>,
}

impl LogFunctionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn skip_exception(mut self, skip: bool) -> Self {
        self.skip_exception = skip;
        self
    }

    #[must_use]
    pub fn extra_info(mut self, info: impl Into<String>) -> Self {
        self.extra_info = Some(info.into());
        self
    }
}

/// A function wrapped by [`LoggerManager::log_function`]
pub struct LoggedFn<'m, F> {
    manager: &'m LoggerManager,
    name: String,
    options: LogFunctionOptions,
    func: F,
}

impl<'m, F> LoggedFn<'m, F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function, attributing the record to the caller
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` when the function
    /// failed and `skip_exception` is set, and the function's own error
    /// (as [`CallError::Function`]) otherwise.
    #[track_caller]
    pub fn call<A, R, E>(&self, args: A) -> std::result::Result<Option<R>, CallError<E>>
    where
        F: Fn(A) -> std::result::Result<R, E>,
        A: CallArgs,
        R: Serialize,
        E: fmt::Display + 'static,
    {
        self.call_at(CallSite::caller(), args)
    }

    /// Call the function with an explicit call site
    pub fn call_at<A, R, E>(
        &self,
        site: CallSite,
        args: A,
    ) -> std::result::Result<Option<R>, CallError<E>>
    where
        F: Fn(A) -> std::result::Result<R, E>,
        A: CallArgs,
        R: Serialize,
        E: fmt::Display + 'static,
    {
        // Captured before the call since the function takes ownership of
        // `args`; a capture failure is reported after the function has run
        let captured = args.capture();
        let info = self.options.extra_info.clone();

        match (self.func)(args) {
            Ok(value) => {
                let record = captured.and_then(|captured| {
                    let returned = render_returned(&value)?;
                    Ok(ExecutionRecord::returned(&site, &self.name, captured, returned, info))
                })?;
                self.manager.emit(&record)?;
                Ok(Some(value))
            }
            Err(error) => {
                let logged = captured.and_then(|captured| {
                    let record = ExecutionRecord::failed(
                        &site,
                        &self.name,
                        captured,
                        &short_type_name::<E>(),
                        describe_error(&error),
                        info,
                    );
                    self.manager.emit(&record)
                });
                if let Err(log_error) = logged {
                    // The function's own error takes precedence
                    eprintln!(
                        "[LOGGER ERROR] Failed to record error of '{}': {}",
                        self.name, log_error
                    );
                    if self.options.skip_exception {
                        return Err(CallError::Logging(log_error));
                    }
                }

                if self.options.skip_exception {
                    Ok(None)
                } else {
                    Err(CallError::Function(error))
                }
            }
        }
    }
}
