//! Response cache for API lookups
//!
//! This module provides a time-boxed cache of backend responses layered over
//! the persisted key-value store. Entries expire after 24 hours and are
//! classified fresh for the first hour, letting the UI show older data with a
//! staleness warning when the backend is unreachable.

mod manager;

pub use manager::{CacheKey, ResponseCache, CACHE_PREFIX, CACHE_TTL_MS, FRESHNESS_WINDOW_MS};
