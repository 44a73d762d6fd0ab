//! Execution-time reporting wrapper

use std::time::{Duration, Instant};

/// Wrap `func` so each call reports its wall-clock duration
///
/// ```
/// use rust_call_wrappers::wrappers::timing;
///
/// let slow_add = timing("slow_add", |(a, b): (u32, u32)| a + b);
/// let (sum, elapsed) = slow_add.call_timed((2, 3));
/// assert_eq!(sum, 5);
/// assert!(elapsed.as_secs() < 1);
/// ```
pub fn timing<F>(name: impl Into<String>, func: F) -> Timed<F> {
    Timed {
        name: name.into(),
        func,
    }
}

/// Run `f` once and return its result with the elapsed time; nothing is reported
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// A function wrapped by [`timing`]
pub struct Timed<F> {
    name: String,
    func: F,
}

impl<F> Timed<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function and report how long it took
    ///
    /// The return value is passed through untouched, so an `Err` result is
    /// timed like any other.
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
    {
        self.call_timed(args).0
    }

    pub fn call_timed<A, R>(&self, args: A) -> (R, Duration)
    where
        F: Fn(A) -> R,
    {
        let report = TimingReport::start(&self.name);
        let result = (self.func)(args);
        (result, report.finish())
    }
}

/// Reports the elapsed time once, on `finish` or when dropped during a panic
struct TimingReport<'a> {
    name: &'a str,
    start: Instant,
    reported: bool,
}

impl<'a> TimingReport<'a> {
    fn start(name: &'a str) -> Self {
        Self {
            name,
            start: Instant::now(),
            reported: false,
        }
    }

    fn finish(mut self) -> Duration {
        let elapsed = self.start.elapsed();
        self.report(elapsed);
        elapsed
    }

    fn report(&mut self, elapsed: Duration) {
        self.reported = true;
        let secs = elapsed.as_secs_f64();
        tracing::info!(
            function = %self.name,
            elapsed_secs = secs,
            "Function {} took {:.3} seconds to execute",
            self.name,
            secs
        );
    }
}

impl Drop for TimingReport<'_> {
    fn drop(&mut self) {
        if !self.reported {
            let elapsed = self.start.elapsed();
            self.report(elapsed);
        }
    }
}
