//! Retry-on-failure wrapper
//!
//! A [`Retry`] holds a validated [`RetryConfig`] and wraps any number of
//! functions. Each call of the wrapped function makes up to `retries`
//! attempts, sleeping `delay` between them. Errors that do not match
//! [`RetryOn`] are returned immediately.

use crate::core::{Result, WrapperError};
use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// A concrete error type that triggers a retry
///
/// Matches the error itself when the wrapped function's error type is `T`,
/// and the boxed value when it returns `Box<dyn Error>` (with or without
/// `Send + Sync`).
#[derive(Clone)]
pub struct ErrorType {
    name: Cow<'static, str>,
    matches: fn(&dyn Any) -> bool,
}

impl ErrorType {
    pub fn of<T: Error + 'static>() -> Self {
        fn matches<T: Error + 'static>(error: &dyn Any) -> bool {
            if error.is::<T>() {
                return true;
            }
            if let Some(boxed) = error.downcast_ref::<Box<dyn Error + Send + Sync>>() {
                return boxed.is::<T>();
            }
            if let Some(boxed) = error.downcast_ref::<Box<dyn Error + Send>>() {
                return boxed.is::<T>();
            }
            if let Some(boxed) = error.downcast_ref::<Box<dyn Error>>() {
                return boxed.is::<T>();
            }
            false
        }

        Self {
            name: crate::core::record::short_type_name::<T>(),
            matches: matches::<T>,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorType").field(&self.name).finish()
    }
}

/// Which errors are retried
pub enum RetryOn<E> {
    /// Every error
    Any,
    /// Errors the predicate accepts
    When(Arc<dyn Fn(&E) -> bool + Send + Sync>),
    /// Errors of one of the listed types; must not be empty
    Types(Vec<ErrorType>),
}

impl<E: 'static> RetryOn<E> {
    pub fn when(predicate: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        RetryOn::When(Arc::new(predicate))
    }

    pub fn matches(&self, error: &E) -> bool {
        match self {
            RetryOn::Any => true,
            RetryOn::When(predicate) => predicate(error),
            RetryOn::Types(types) => types.iter().any(|t| (t.matches)(error as &dyn Any)),
        }
    }
}

impl<E> Clone for RetryOn<E> {
    fn clone(&self) -> Self {
        match self {
            RetryOn::Any => RetryOn::Any,
            RetryOn::When(predicate) => RetryOn::When(Arc::clone(predicate)),
            RetryOn::Types(types) => RetryOn::Types(types.clone()),
        }
    }
}

impl<E> fmt::Debug for RetryOn<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryOn::Any => write!(f, "Any"),
            RetryOn::When(_) => write!(f, "When(<predicate>)"),
            RetryOn::Types(types) => f.debug_tuple("Types").field(types).finish(),
        }
    }
}

pub struct RetryConfig<E> {
    /// Total number of attempts, at least 1
    pub retries: u32,
    /// Pause between attempts, non-zero
    pub delay: Duration,
    /// Return the last error once attempts run out instead of `Ok(None)`
    pub raise_on_exhaustion: bool,
    pub retry_on: RetryOn<E>,
}

impl<E> Clone for RetryConfig<E> {
    fn clone(&self) -> Self {
        Self {
            retries: self.retries,
            delay: self.delay,
            raise_on_exhaustion: self.raise_on_exhaustion,
            retry_on: self.retry_on.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("retries", &self.retries)
            .field("delay", &self.delay)
            .field("raise_on_exhaustion", &self.raise_on_exhaustion)
            .field("retry_on", &self.retry_on)
            .finish()
    }
}

impl<E> Default for RetryConfig<E> {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay: DEFAULT_DELAY,
            raise_on_exhaustion: false,
            retry_on: RetryOn::Any,
        }
    }
}

impl<E> RetryConfig<E> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn raise_on_exhaustion(mut self, raise: bool) -> Self {
        self.raise_on_exhaustion = raise;
        self
    }

    #[must_use]
    pub fn retry_on(mut self, retry_on: RetryOn<E>) -> Self {
        self.retry_on = retry_on;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.retries < 1 || self.delay.is_zero() {
            return Err(WrapperError::config(
                "Retry",
                "retries must be at least 1 and delay must be greater than zero",
            ));
        }
        if let RetryOn::Types(ref types) = self.retry_on {
            if types.is_empty() {
                return Err(WrapperError::config(
                    "Retry",
                    "retry_on must list at least one error type",
                ));
            }
        }
        Ok(())
    }
}

/// Validated retry policy, reusable across functions
#[derive(Debug)]
pub struct Retry<E> {
    config: RetryConfig<E>,
}

impl<E> Clone for Retry<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl<E> Retry<E> {
    /// # Errors
    ///
    /// `InvalidConfiguration` when `retries` is 0, `delay` is zero or
    /// `retry_on` lists no error types.
    pub fn new(config: RetryConfig<E>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RetryConfig<E> {
        &self.config
    }

    pub fn wrap<F>(&self, name: impl Into<String>, func: F) -> Retrying<E, F> {
        Retrying {
            name: name.into(),
            retry: self.clone(),
            func,
        }
    }
}

/// Shorthand for [`Retry::new`]
pub fn retry<E>(config: RetryConfig<E>) -> Result<Retry<E>> {
    Retry::new(config)
}

/// A function wrapped by [`Retry::wrap`]
pub struct Retrying<E, F> {
    name: String,
    retry: Retry<E>,
    func: F,
}

impl<E, F> Retrying<E, F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function until it succeeds or attempts run out
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` when every attempt
    /// failed and `raise_on_exhaustion` is off. Non-matching errors and
    /// exhausted errors (with `raise_on_exhaustion`) are returned as is.
    pub fn call<A, R>(&self, args: A) -> std::result::Result<Option<R>, E>
    where
        F: Fn(A) -> std::result::Result<R, E>,
        A: Clone,
        E: fmt::Display + 'static,
    {
        let config = &self.retry.config;
        let retries = config.retries;

        for attempt in 1..=retries {
            tracing::info!(
                function = %self.name,
                attempt,
                retries,
                "Attempt {}/{} for function '{}'",
                attempt,
                retries,
                self.name
            );

            let error = match (self.func)(args.clone()) {
                Ok(value) => return Ok(Some(value)),
                Err(error) => error,
            };

            if !config.retry_on.matches(&error) {
                return Err(error);
            }

            if attempt == retries {
                tracing::error!(
                    function = %self.name,
                    attempts = retries,
                    error = %error,
                    "Function '{}' failed after {} attempts",
                    self.name,
                    retries
                );
                if config.raise_on_exhaustion {
                    return Err(error);
                }
                return Ok(None);
            }

            tracing::warn!(
                function = %self.name,
                attempt,
                delay = ?config.delay,
                "Retrying after error: {}",
                error
            );
            thread::sleep(config.delay);
        }

        // `retries >= 1` is checked by `Retry::new`
        Ok(None)
    }
}
