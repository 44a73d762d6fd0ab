//! Memoizing result cache
//!
//! Results are keyed by `(function name, positional args, keyword args)`.
//! Arguments are compared by their canonical JSON text, so two calls hit the
//! same entry exactly when their arguments serialize identically (keyword
//! order does not matter).

use crate::core::{CallArgs, CapturedArgs, Result};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    name: String,
    args: String,
    kwargs: String,
}

impl CacheKey {
    fn new(name: &str, captured: &CapturedArgs) -> Self {
        Self {
            name: name.to_string(),
            args: captured.args_key(),
            kwargs: captured.kwargs_key(),
        }
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    /// Insertion sequence; kept when the value is replaced
    seq: u64,
}

#[derive(Debug)]
struct CacheStore<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
    next_seq: u64,
}

impl<V> CacheStore<V> {
    fn insert(&mut self, key: CacheKey, value: V) {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().value = value,
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry {
                    value,
                    seq: self.next_seq,
                });
                self.next_seq += 1;
            }
        }
    }
}

/// Result of [`MemoizingCache::lookup`]
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    /// Exact-key lookup
    Exact(Option<V>),
    /// Partial lookup; values in insertion order
    Matches(Vec<V>),
}

/// Cache of function results shared by any number of wrapped functions
#[derive(Debug)]
pub struct MemoizingCache<V> {
    store: Mutex<CacheStore<V>>,
}

impl<V: Clone> MemoizingCache<V> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(CacheStore {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Wrap `func` so results are served from this cache
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_call_wrappers::wrappers::MemoizingCache;
    ///
    /// let cache = MemoizingCache::new();
    /// let square = cache.cache_func("square", |(x,): (i64,)| x * x);
    /// assert_eq!(square.call((4,)).unwrap(), 16);
    /// assert_eq!(cache.get_cached_value("square", &(4,)).unwrap(), Some(16));
    /// ```
    pub fn cache_func<F>(&self, name: impl Into<String>, func: F) -> CachedFn<'_, V, F> {
        CachedFn {
            cache: self,
            name: name.into(),
            func,
        }
    }

    /// Value stored under exactly these arguments
    pub fn get_cached_value<A: CallArgs + ?Sized>(&self, name: &str, args: &A) -> Result<Option<V>> {
        let key = CacheKey::new(name, &args.capture()?);
        Ok(self.store.lock().entries.get(&key).map(|entry| entry.value.clone()))
    }

    /// Values whose arguments match the query
    ///
    /// Empty positional or keyword arguments in the query act as wildcards
    /// for that part of the key.
    pub fn get_matching_values<A: CallArgs + ?Sized>(&self, name: &str, args: &A) -> Result<Vec<V>> {
        let captured = args.capture()?;
        let query = CacheKey::new(name, &captured);

        let store = self.store.lock();
        let mut matches: Vec<&CacheEntry<V>> = store
            .entries
            .iter()
            .filter(|(key, _)| {
                key.name == query.name
                    && (captured.args.is_empty() || key.args == query.args)
                    && (captured.kwargs.is_empty() || key.kwargs == query.kwargs)
            })
            .map(|(_, entry)| entry)
            .collect();
        matches.sort_by_key(|entry| entry.seq);

        Ok(matches.into_iter().map(|entry| entry.value.clone()).collect())
    }

    pub fn lookup<A: CallArgs + ?Sized>(
        &self,
        name: &str,
        args: &A,
        compare_all: bool,
    ) -> Result<CacheLookup<V>> {
        if compare_all {
            self.get_cached_value(name, args).map(CacheLookup::Exact)
        } else {
            self.get_matching_values(name, args).map(CacheLookup::Matches)
        }
    }

    /// Store `value` as if `name` had returned it for `args`
    pub fn manual_cache<A: CallArgs + ?Sized>(&self, name: &str, value: V, args: &A) -> Result<()> {
        let key = CacheKey::new(name, &args.capture()?);
        self.store.lock().insert(key, value);
        Ok(())
    }

    pub fn clear_cache(&self) {
        let mut store = self.store.lock();
        store.entries.clear();
        store.next_seq = 0;
    }

    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for MemoizingCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A function wrapped by [`MemoizingCache::cache_func`]
pub struct CachedFn<'c, V, F> {
    cache: &'c MemoizingCache<V>,
    name: String,
    func: F,
}

impl<'c, V: Clone, F> CachedFn<'c, V, F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the cached value for `args`, computing and storing it on a miss
    ///
    /// The cache is not locked while `func` runs, so concurrent misses on the
    /// same key may compute the value more than once.
    pub fn call<A>(&self, args: A) -> Result<V>
    where
        F: Fn(A) -> V,
        A: CallArgs,
    {
        let key = CacheKey::new(&self.name, &args.capture()?);

        if let Some(entry) = self.cache.store.lock().entries.get(&key) {
            return Ok(entry.value.clone());
        }

        let value = (self.func)(args);
        self.cache.store.lock().insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{kwargs_only, WithKwargs};
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_cached_function_runs_once_per_key() {
        let cache = MemoizingCache::new();
        let calls = Cell::new(0);
        let add = cache.cache_func("add", |(a, b): (i32, i32)| {
            calls.set(calls.get() + 1);
            a + b
        });

        assert_eq!(add.call((1, 2)).unwrap(), 3);
        assert_eq!(add.call((1, 2)).unwrap(), 3);
        assert_eq!(calls.get(), 1);

        assert_eq!(add.call((2, 2)).unwrap(), 4);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_functions_do_not_share_entries() {
        let cache = MemoizingCache::new();
        let double = cache.cache_func("double", |(x,): (i32,)| x * 2);
        let triple = cache.cache_func("triple", |(x,): (i32,)| x * 3);

        assert_eq!(double.call((5,)).unwrap(), 10);
        assert_eq!(triple.call((5,)).unwrap(), 15);
        assert_eq!(cache.get_cached_value("double", &(5,)).unwrap(), Some(10));
        assert_eq!(cache.get_cached_value("triple", &(5,)).unwrap(), Some(15));
    }

    #[test]
    fn test_kwargs_order_does_not_matter() {
        let cache = MemoizingCache::new();
        cache
            .manual_cache("f", "v".to_string(), &kwargs_only(json!({ "a": 1, "b": 2 })))
            .unwrap();

        let hit = cache
            .get_cached_value("f", &kwargs_only(json!({ "b": 2, "a": 1 })))
            .unwrap();
        assert_eq!(hit.as_deref(), Some("v"));
    }

    #[test]
    fn test_manual_cache_short_circuits_function() {
        let cache = MemoizingCache::new();
        cache.manual_cache("slow", 99, &(1,)).unwrap();

        let slow = cache.cache_func("slow", |(_x,): (i32,)| -> i32 { panic!("not called") });
        assert_eq!(slow.call((1,)).unwrap(), 99);
    }

    #[test]
    fn test_partial_matching() {
        let cache = MemoizingCache::new();
        cache.manual_cache("f", 1, &(1,)).unwrap();
        cache
            .manual_cache("f", 2, &WithKwargs::new((1,), json!({ "k": "x" })))
            .unwrap();
        cache.manual_cache("f", 3, &(2,)).unwrap();
        cache.manual_cache("g", 4, &(1,)).unwrap();

        assert_eq!(cache.get_matching_values("f", &(1,)).unwrap(), vec![1, 2]);
        assert_eq!(cache.get_matching_values("f", &()).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            cache
                .get_matching_values("f", &kwargs_only(json!({ "k": "x" })))
                .unwrap(),
            vec![2]
        );
        assert!(cache.get_matching_values("h", &()).unwrap().is_empty());
    }

    #[test]
    fn test_replacing_value_keeps_position() {
        let cache = MemoizingCache::new();
        cache.manual_cache("f", 1, &(1,)).unwrap();
        cache.manual_cache("f", 2, &(2,)).unwrap();
        cache.manual_cache("f", 10, &(1,)).unwrap();

        assert_eq!(cache.get_matching_values("f", &()).unwrap(), vec![10, 2]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lookup_dispatch() {
        let cache = MemoizingCache::new();
        cache.manual_cache("f", 7, &(1, 2)).unwrap();

        assert_eq!(cache.lookup("f", &(1, 2), true).unwrap(), CacheLookup::Exact(Some(7)));
        assert_eq!(cache.lookup("f", &(9,), true).unwrap(), CacheLookup::Exact(None));
        assert_eq!(cache.lookup("f", &(), false).unwrap(), CacheLookup::Matches(vec![7]));
    }

    #[test]
    fn test_clear_cache() {
        let cache = MemoizingCache::new();
        cache.manual_cache("f", 1, &(1,)).unwrap();
        assert!(!cache.is_empty());

        cache.clear_cache();
        assert!(cache.is_empty());
        assert_eq!(cache.get_cached_value("f", &(1,)).unwrap(), None);
    }

    #[test]
    fn test_unserializable_kwargs_rejected() {
        let cache: MemoizingCache<i32> = MemoizingCache::new();
        let err = cache.manual_cache("f", 1, &kwargs_only(5)).unwrap_err();
        assert!(err.is_serialization());
    }
}
