//! Property-based tests for rust_call_wrappers using proptest

use proptest::prelude::*;
use rust_call_wrappers::prelude::*;
use rust_call_wrappers::sinks::{RotatingFileSink, RotationPolicy};
use serde_json::{json, Value};
use std::cell::Cell;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
    ]
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Level names parse back to the same level
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Ordering follows severity
    #[test]
    fn test_log_level_ordering(level1 in any_level(), level2 in any_level()) {
        let val1 = level1 as u8;
        let val2 = level2 as u8;
        prop_assert_eq!(level1 <= level2, val1 <= val2);
        prop_assert_eq!(level1 < level2, val1 < val2);
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// Any message stays on one line and survives JSON encoding
    #[test]
    fn test_json_line_is_single_line(message in ".*", line in 1u32..10_000) {
        let record = ExecutionRecord::message(LogLevel::Info, &CallSite::new("x.rs", line), message.clone());
        let formatted = JsonLineFormatter::new().format(&record).unwrap();

        prop_assert!(!formatted.contains('\n'));
        let parsed: Value = serde_json::from_str(&formatted).unwrap();
        prop_assert_eq!(&parsed["info"], &json!(message));
        prop_assert_eq!(&parsed["lineno"], &json!(line));
    }

    /// The text formatter never emits raw line breaks
    #[test]
    fn test_text_line_is_single_line(message in ".*") {
        let record = ExecutionRecord::message(LogLevel::Warning, &CallSite::new("x.rs", 1), message);
        let formatted = TextFormatter::new().format(&record).unwrap();
        prop_assert!(!formatted.contains('\n'));
        prop_assert!(!formatted.contains('\r'));
    }
}

// ============================================================================
// Cache Tests
// ============================================================================

proptest! {
    /// A manually cached value is found again under the same arguments
    #[test]
    fn test_cache_round_trip(a in any::<i64>(), b in ".{0,16}", value in any::<u32>()) {
        let cache = MemoizingCache::new();
        cache.manual_cache("f", value, &WithKwargs::new((a,), json!({ "b": b }))).unwrap();

        let hit = cache.get_cached_value("f", &WithKwargs::new((a,), json!({ "b": b }))).unwrap();
        prop_assert_eq!(hit, Some(value));
        prop_assert_eq!(cache.get_matching_values("f", &(a,)).unwrap(), vec![value]);
    }

    /// The wrapped function runs once per distinct argument
    #[test]
    fn test_cache_calls_once_per_key(inputs in prop::collection::vec(0u8..8, 1..40)) {
        let calls = Cell::new(0usize);
        let cache = MemoizingCache::new();
        let double = cache.cache_func("double", |(x,): (u8,)| {
            calls.set(calls.get() + 1);
            u16::from(x) * 2
        });

        for &x in &inputs {
            prop_assert_eq!(double.call((x,)).unwrap(), u16::from(x) * 2);
        }

        let mut distinct = inputs.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(calls.get(), distinct.len());
        prop_assert_eq!(cache.len(), distinct.len());
    }
}

// ============================================================================
// Retry Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// An always-failing function is attempted exactly `retries` times
    #[test]
    fn test_retry_attempt_count(retries in 1u32..6) {
        let calls = Cell::new(0u32);
        let policy = retry(RetryConfig::new().retries(retries).delay(Duration::from_micros(10))).unwrap();
        let wrapped = policy.wrap("always_fails", |_: ()| {
            calls.set(calls.get() + 1);
            Err::<(), _>(std::fmt::Error)
        });

        prop_assert!(wrapped.call(()).unwrap().is_none());
        prop_assert_eq!(calls.get(), retries);
    }
}

// ============================================================================
// Rotation Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Rotation never keeps more than `backup_count` backups
    #[test]
    fn test_rotation_bounds_files(
        max_bytes in 16u64..256,
        backup_count in 0usize..4,
        lines in prop::collection::vec("[a-z]{1,40}", 1..60),
    ) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prop.jsonl");
        let policy = RotationPolicy::new()
            .with_max_bytes(max_bytes)
            .with_backup_count(backup_count);

        {
            let mut sink = RotatingFileSink::with_policy(&path, policy).unwrap();
            for line in &lines {
                sink.write_line(LogLevel::Info, line).unwrap();
            }
        }

        let files = fs::read_dir(temp_dir.path()).unwrap().count();
        prop_assert!(files <= backup_count + 1);
        let past_limit = temp_dir.path().join(format!("prop.jsonl.{}", backup_count + 1));
        prop_assert!(!past_limit.exists());
    }
}
