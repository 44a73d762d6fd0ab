//! Structured view of a wrapped function's arguments
//!
//! Wrapped functions take a single input value. `CallArgs` turns that value
//! into the positional and keyword lists that appear in execution records and
//! cache keys. Tuples of serializable values are positional arguments;
//! [`WithKwargs`] adds keyword arguments on top of such a tuple.

use super::error::Result;
use serde::Serialize;
use serde_json::{Map, Value};

/// Positional and keyword arguments of one call
pub trait CallArgs {
    /// Positional arguments, in order
    fn positional(&self) -> Result<Vec<Value>>;

    /// Keyword arguments, sorted by name
    fn keyword(&self) -> Result<Map<String, Value>> {
        Ok(Map::new())
    }

    /// Capture both views at once
    fn capture(&self) -> Result<CapturedArgs> {
        Ok(CapturedArgs {
            args: self.positional()?,
            kwargs: self.keyword()?,
        })
    }
}

impl<A: CallArgs + ?Sized> CallArgs for &A {
    fn positional(&self) -> Result<Vec<Value>> {
        (**self).positional()
    }

    fn keyword(&self) -> Result<Map<String, Value>> {
        (**self).keyword()
    }
}

macro_rules! impl_call_args_for_tuple {
    ($($name:ident),*) => {
        impl<$($name: Serialize),*> CallArgs for ($($name,)*) {
            #[allow(non_snake_case)]
            fn positional(&self) -> Result<Vec<Value>> {
                let ($($name,)*) = self;
                Ok(vec![$(serde_json::to_value($name)?),*])
            }
        }
    };
}

impl_call_args_for_tuple!();
impl_call_args_for_tuple!(T1);
impl_call_args_for_tuple!(T1, T2);
impl_call_args_for_tuple!(T1, T2, T3);
impl_call_args_for_tuple!(T1, T2, T3, T4);
impl_call_args_for_tuple!(T1, T2, T3, T4, T5);
impl_call_args_for_tuple!(T1, T2, T3, T4, T5, T6);
impl_call_args_for_tuple!(T1, T2, T3, T4, T5, T6, T7);
impl_call_args_for_tuple!(T1, T2, T3, T4, T5, T6, T7, T8);

/// Positional arguments plus keyword arguments
///
/// `kwargs` must serialize to a JSON object (a struct, a map, or a
/// `serde_json::json!({...})` value).
///
/// ```
/// use rust_call_wrappers::core::{CallArgs, WithKwargs};
/// use serde_json::json;
///
/// let args = WithKwargs::new((1, 2), json!({ "key": "value" }));
/// assert_eq!(args.positional().unwrap(), vec![json!(1), json!(2)]);
/// assert_eq!(args.keyword().unwrap()["key"], json!("value"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WithKwargs<A, K> {
    pub args: A,
    pub kwargs: K,
}

impl<A, K> WithKwargs<A, K> {
    pub fn new(args: A, kwargs: K) -> Self {
        Self { args, kwargs }
    }
}

/// Keyword arguments only
pub fn kwargs_only<K>(kwargs: K) -> WithKwargs<(), K> {
    WithKwargs::new((), kwargs)
}

impl<A: CallArgs, K: Serialize> CallArgs for WithKwargs<A, K> {
    fn positional(&self) -> Result<Vec<Value>> {
        self.args.positional()
    }

    fn keyword(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(&self.kwargs)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "keyword arguments must serialize to an object, got {}",
                other
            ))
            .into()),
        }
    }
}

/// Arguments captured from one call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CapturedArgs {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl CapturedArgs {
    /// Canonical text of the positional arguments
    pub fn args_key(&self) -> String {
        Value::Array(self.args.clone()).to_string()
    }

    /// Canonical text of the keyword arguments (keys are sorted)
    pub fn kwargs_key(&self) -> String {
        Value::Object(self.kwargs.clone()).to_string()
    }
}
