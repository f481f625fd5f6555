//! Time-boxed response cache over the key-value store
//!
//! Stores API response bodies as JSON entries carrying the write timestamp.
//! An entry older than the 24-hour TTL is treated as absent and removed on
//! the next read; a separate one-hour window classifies present entries as
//! fresh or stale.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::KeyValueStore;

/// Namespace prefix for cache entries in the key-value store
pub const CACHE_PREFIX: &str = "cache:";

/// Time-to-live for cache entries; an entry this old is expired
pub const CACHE_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Entries younger than this are considered fresh
pub const FRESHNESS_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Wrapper struct for cached data in the store
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The cached response body
    data: Value,
    /// Epoch milliseconds when the entry was written
    timestamp: i64,
}

/// Structured cache key: endpoint path plus sorted query parameters.
///
/// Parameters live in a `BTreeMap`, so two keys built from the same
/// parameters in different orders serialize identically and can never fork
/// the key space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    endpoint: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    /// Creates a key for an endpoint with no parameters.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a query parameter to the key.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Canonical serialization: endpoint followed by sorted-key JSON of the
    /// parameters.
    pub fn canonical(&self) -> String {
        // A map of strings always serializes; fall back to the bare endpoint
        // rather than propagate an impossible error.
        let params = serde_json::to_string(&self.params).unwrap_or_default();
        format!("{}{}", self.endpoint, params)
    }
}

/// Cache of backend responses keyed by endpoint + parameters
///
/// All operations swallow store failures: `get` degrades to `None`, `set` and
/// `clear` to no-ops. Callers must remain correct with caching entirely
/// unavailable.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn storage_key(key: &CacheKey) -> String {
        format!("{}{}", CACHE_PREFIX, key.canonical())
    }

    /// Returns the cached value for `key` if present and not expired.
    ///
    /// An expired entry (age >= TTL) is removed as a side effect.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    /// Like `get` but with an explicit current time (for deterministic tests).
    pub fn get_at(&self, key: &CacheKey, now_ms: i64) -> Option<Value> {
        let storage_key = Self::storage_key(key);
        let raw = self.store.get(&storage_key)?;
        let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
            // Corrupt entry, drop it
            self.store.remove(&storage_key);
            return None;
        };
        if now_ms - entry.timestamp >= CACHE_TTL_MS {
            self.store.remove(&storage_key);
            return None;
        }
        Some(entry.data)
    }

    /// Stores a response body under `key`, stamped with the current time.
    pub fn set(&self, key: &CacheKey, value: Value) {
        self.set_at(key, value, Utc::now().timestamp_millis());
    }

    /// Like `set` but with an explicit timestamp (for deterministic tests).
    pub fn set_at(&self, key: &CacheKey, value: Value, now_ms: i64) {
        let entry = CacheEntry {
            data: value,
            timestamp: now_ms,
        };
        if let Ok(json) = serde_json::to_string(&entry) {
            self.store.set(&Self::storage_key(key), &json);
        }
    }

    /// True iff an entry exists for `key` and is younger than the freshness
    /// window (one hour).
    pub fn is_fresh(&self, key: &CacheKey) -> bool {
        self.is_fresh_at(key, Utc::now().timestamp_millis())
    }

    /// Like `is_fresh` but with an explicit current time.
    pub fn is_fresh_at(&self, key: &CacheKey, now_ms: i64) -> bool {
        let Some(raw) = self.store.get(&Self::storage_key(key)) else {
            return false;
        };
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => now_ms - entry.timestamp < FRESHNESS_WINDOW_MS,
            Err(_) => false,
        }
    }

    /// Removes every entry under the cache namespace, leaving unrelated keys
    /// (favorites, theme) untouched.
    pub fn clear(&self) {
        for key in self.store.list_keys() {
            if key.starts_with(CACHE_PREFIX) {
                self.store.remove(&key);
            }
        }
    }

    /// Aggregate byte length of all cache entries (diagnostic only).
    pub fn size(&self) -> u64 {
        self.store
            .list_keys()
            .iter()
            .filter(|key| key.starts_with(CACHE_PREFIX))
            .filter_map(|key| self.store.get(key))
            .map(|value| value.len() as u64)
            .sum()
    }
}
