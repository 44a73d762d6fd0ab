//! Execution records and call sites

use super::call_args::CapturedArgs;
use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// `returned` value of records that do not describe a function call
pub const NON_FUNCTION_LOG: &str = "NonFunctionLog";

/// File and line a record is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Basename of the caller's source file
    pub file: String,
    pub line: u32,
}

impl CallSite {
    pub fn new(file: &str, line: u32) -> Self {
        let file = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file)
            .to_string();
        Self { file, line }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// One structured log event
///
/// Built transiently by the emitting call and formatted once per sink. The
/// timestamp is added by the formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub level: LogLevel,
    pub file_name: String,
    pub lineno: u32,
    pub function_name: Option<String>,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
    pub returned: String,
    pub info: Option<String>,
    pub exc: Option<String>,
}

impl ExecutionRecord {
    /// Record for an informational message
    pub fn message(level: LogLevel, site: &CallSite, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: site.file.clone(),
            lineno: site.line,
            function_name: None,
            args: Vec::new(),
            kwargs: Map::new(),
            returned: NON_FUNCTION_LOG.to_string(),
            info: Some(message.into()),
            exc: None,
        }
    }

    /// Record for a call that returned normally
    pub fn returned(
        site: &CallSite,
        function_name: &str,
        args: CapturedArgs,
        returned: String,
        info: Option<String>,
    ) -> Self {
        Self {
            level: LogLevel::Debug,
            file_name: site.file.clone(),
            lineno: site.line,
            function_name: Some(function_name.to_string()),
            args: args.args,
            kwargs: args.kwargs,
            returned,
            info,
            exc: None,
        }
    }

    /// Record for a call whose function failed
    ///
    /// `returned` carries the error's type name since no value was produced.
    pub fn failed(
        site: &CallSite,
        function_name: &str,
        args: CapturedArgs,
        error_type: &str,
        exc: String,
        info: Option<String>,
    ) -> Self {
        Self {
            level: LogLevel::Error,
            file_name: site.file.clone(),
            lineno: site.line,
            function_name: Some(function_name.to_string()),
            args: args.args,
            kwargs: args.kwargs,
            returned: error_type.to_string(),
            info,
            exc: Some(exc),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.exc.is_some()
    }
}

/// Name of a type with every module path removed
///
/// `std::num::ParseIntError` becomes `ParseIntError` and
/// `Box<dyn core::error::Error + core::marker::Send>` becomes
/// `Box<dyn Error + Send>`.
pub fn short_type_name<T: ?Sized>() -> Cow<'static, str> {
    let full = std::any::type_name::<T>();
    if !full.contains('<') {
        return Cow::Borrowed(full.rsplit("::").next().unwrap_or(full));
    }

    let mut short = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (idx, ch) in full.char_indices() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            continue;
        }
        short.push_str(strip_path(&full[segment_start..idx]));
        short.push(ch);
        segment_start = idx + ch.len_utf8();
    }
    short.push_str(strip_path(&full[segment_start..]));
    Cow::Owned(short)
}

fn strip_path(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Render an error as `<TypeName>: <message>`
///
/// Boxed `dyn Error` values also list their `source()` chain, one
/// `Caused by:` line per cause.
pub fn describe_error<E: fmt::Display + 'static>(error: &E) -> String {
    let mut text = format!("{}: {}", short_type_name::<E>(), error);
    if let Some(boxed) = as_boxed_error(error) {
        append_sources(&mut text, boxed);
    }
    text
}

/// Render an error and every cause in its `source()` chain
pub fn describe_error_chain<E: Error + 'static>(error: &E) -> String {
    let mut text = format!("{}: {}", short_type_name::<E>(), error);
    append_sources(&mut text, error);
    text
}

fn append_sources(text: &mut String, error: &(dyn Error + 'static)) {
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\nCaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
}

fn as_boxed_error(error: &dyn Any) -> Option<&(dyn Error + 'static)> {
    if let Some(boxed) = error.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        let error: &(dyn Error + 'static) = &**boxed;
        return Some(error);
    }
    if let Some(boxed) = error.downcast_ref::<Box<dyn Error + Send>>() {
        let error: &(dyn Error + 'static) = &**boxed;
        return Some(error);
    }
    if let Some(boxed) = error.downcast_ref::<Box<dyn Error>>() {
        let error: &(dyn Error + 'static) = &**boxed;
        return Some(error);
    }
    None
}

/// Render a returned value
///
/// Strings are kept bare, everything else becomes compact JSON text, so
/// `3` renders as `3`, `"hello"` as `hello` and `()` as `null`.
pub fn render_returned<R: Serialize + ?Sized>(value: &R) -> serde_json::Result<String> {
    match serde_json::to_value(value)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_site_keeps_basename() {
        let site = CallSite::new("src/core/record.rs", 42);
        assert_eq!(site.file, "record.rs");
        assert_eq!(site.line, 42);
    }

    #[test]
    fn test_caller_points_here() {
        let line = line!() + 1;
        let site = CallSite::caller();
        assert_eq!(site.file, "record.rs");
        assert_eq!(site.line, line);
    }

    #[test]
    fn test_message_record() {
        let site = CallSite::new("main.rs", 7);
        let record = ExecutionRecord::message(LogLevel::Info, &site, "started");
        assert_eq!(record.function_name, None);
        assert!(record.args.is_empty());
        assert_eq!(record.returned, NON_FUNCTION_LOG);
        assert_eq!(record.info.as_deref(), Some("started"));
        assert!(!record.is_failure());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<std::num::ParseIntError>(), "ParseIntError");
        assert_eq!(short_type_name::<u32>(), "u32");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
        assert_eq!(
            short_type_name::<Box<dyn std::error::Error + Send + Sync>>(),
            "Box<dyn Error + Send + Sync>"
        );
    }

    #[derive(Debug)]
    struct Outer(std::num::ParseIntError);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("invalid port")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    fn parse_failure() -> std::num::ParseIntError {
        "x".parse::<u16>().unwrap_err()
    }

    #[test]
    fn test_describe_error() {
        assert_eq!(
            describe_error(&parse_failure()),
            "ParseIntError: invalid digit found in string"
        );
    }

    #[test]
    fn test_describe_boxed_error_lists_sources() {
        let boxed: Box<dyn Error + Send + Sync> = Box::new(Outer(parse_failure()));
        assert_eq!(
            describe_error(&boxed),
            "Box<dyn Error + Send + Sync>: invalid port\nCaused by: invalid digit found in string"
        );

        let plain: Box<dyn Error> = "disk full".into();
        assert_eq!(describe_error(&plain), "Box<dyn Error>: disk full");
    }

    #[test]
    fn test_describe_error_chain() {
        assert_eq!(
            describe_error_chain(&Outer(parse_failure())),
            "Outer: invalid port\nCaused by: invalid digit found in string"
        );
    }

    #[test]
    fn test_render_returned() {
        assert_eq!(render_returned(&3).unwrap(), "3");
        assert_eq!(render_returned("hello").unwrap(), "hello");
        assert_eq!(render_returned(&()).unwrap(), "null");
        assert_eq!(render_returned(&vec![1, 2]).unwrap(), "[1,2]");
        assert_eq!(render_returned(&json!({"a": 1})).unwrap(), "{\"a\":1}");
    }
}
