//! Record formatters
//!
//! A formatter turns one [`ExecutionRecord`] into one output line. The
//! JSON-lines formatter is the default for files; the text formatter is the
//! default for the console. Any `Fn(&ExecutionRecord) -> Result<String>`
//! closure can be used as a custom formatter.

use super::error::Result;
use super::record::ExecutionRecord;
use super::timestamp::TimestampFormat;
use serde::Serialize;
use serde_json::{Map, Value};

/// Renders a record to a single line (without trailing newline)
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &ExecutionRecord) -> Result<String>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> RecordFormatter for F
where
    F: Fn(&ExecutionRecord) -> Result<String> + Send + Sync,
{
    fn format(&self, record: &ExecutionRecord) -> Result<String> {
        self(record)
    }
}

/// Serialized shape of one JSON line; field order is the key order
#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'static str,
    file_name: &'a str,
    lineno: u32,
    function_name: Option<&'a str>,
    returned: &'a str,
    args: &'a [Value],
    kwargs: &'a Map<String, Value>,
    info: Option<&'a str>,
    exc: Option<&'a str>,
}

/// Formats records as single-line JSON objects (JSONL)
///
/// Keys appear in a stable order: `timestamp, level, file_name, lineno,
/// function_name, returned, args, kwargs, info, exc`.
#[derive(Debug, Clone, Default)]
pub struct JsonLineFormatter {
    timestamp_format: TimestampFormat,
}

impl JsonLineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl RecordFormatter for JsonLineFormatter {
    fn format(&self, record: &ExecutionRecord) -> Result<String> {
        let line = JsonLine {
            timestamp: self.timestamp_format.now(),
            level: record.level.to_str(),
            file_name: &record.file_name,
            lineno: record.lineno,
            function_name: record.function_name.as_deref(),
            returned: &record.returned,
            args: &record.args,
            kwargs: &record.kwargs,
            info: record.info.as_deref(),
            exc: record.exc.as_deref(),
        };
        Ok(serde_json::to_string(&line)?)
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// Human-readable single-line formatter
///
/// `[DEBUG|main.rs/add|12] 2025-01-08 10:30:45.123456 - args/kwargs: [1,2]/{} Returned: 3`
///
/// Failed calls end in `Raised: <exc>` instead of `Returned: ...`.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl RecordFormatter for TextFormatter {
    fn format(&self, record: &ExecutionRecord) -> Result<String> {
        let args = serde_json::to_string(&record.args)?;
        let kwargs = serde_json::to_string(&record.kwargs)?;

        let outcome = match record.exc {
            Some(ref exc) => format!("Raised: {}", exc),
            None => format!("Returned: {}", record.returned),
        };

        // Keep one record per line even when values contain line breaks
        let line = format!(
            "[{}|{}/{}|{}] {} - args/kwargs: {}/{} {}",
            record.level.to_str(),
            record.file_name,
            record.function_name.as_deref().unwrap_or("None"),
            record.lineno,
            self.timestamp_format.now(),
            args,
            kwargs,
            outcome
        )
        .replace('\n', "\\n")
        .replace('\r', "\\r");

        Ok(line)
    }

    fn name(&self) -> &str {
        "text"
    }
}
