//! Favorites registry for routes and stops
//!
//! Saved entries live as a single JSON array in the key-value store, newest
//! first. Identity is structural: a tagged `FavoriteKey` decides whether two
//! entries are the same favorite, while the derived string id is still
//! persisted for compatibility with arrays written by older versions. Older
//! arrays may also lack the `type` discriminator; those entries are migrated
//! on read and the repaired list is written back once.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::{DayType, Direction};
use crate::store::KeyValueStore;

/// Store key holding the favorites array
pub const FAVORITES_KEY: &str = "favorites";

/// Structural identity of a favorite
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FavoriteKey {
    /// A whole route
    Route { route: String },
    /// A specific stop on a route, pinned to direction and day type
    Stop {
        route: String,
        stop: String,
        direction: Direction,
        day_type: DayType,
    },
}

impl FavoriteKey {
    /// Legacy string id, kept in persisted entries.
    pub fn id(&self) -> String {
        match self {
            FavoriteKey::Route { route } => format!("route_{}", route),
            FavoriteKey::Stop {
                route,
                stop,
                direction,
                day_type,
            } => format!(
                "{}_{}_{}_{}",
                route,
                stop,
                direction.as_query(),
                day_type.as_str()
            ),
        }
    }
}

/// A saved favorite as persisted in the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FavoriteEntry {
    Route {
        route_name: String,
        #[serde(default)]
        route_long_name: String,
        #[serde(default)]
        timestamp: i64,
        #[serde(default)]
        id: String,
    },
    Stop {
        route_name: String,
        #[serde(default)]
        route_long_name: String,
        stop_name: String,
        direction: Direction,
        day_type: DayType,
        #[serde(default)]
        timestamp: i64,
        #[serde(default)]
        id: String,
    },
}

impl FavoriteEntry {
    /// Structural key identifying this entry.
    pub fn key(&self) -> FavoriteKey {
        match self {
            FavoriteEntry::Route { route_name, .. } => FavoriteKey::Route {
                route: route_name.clone(),
            },
            FavoriteEntry::Stop {
                route_name,
                stop_name,
                direction,
                day_type,
                ..
            } => FavoriteKey::Stop {
                route: route_name.clone(),
                stop: stop_name.clone(),
                direction: *direction,
                day_type: *day_type,
            },
        }
    }

    pub fn route_name(&self) -> &str {
        match self {
            FavoriteEntry::Route { route_name, .. } => route_name,
            FavoriteEntry::Stop { route_name, .. } => route_name,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            FavoriteEntry::Route { timestamp, .. } => *timestamp,
            FavoriteEntry::Stop { timestamp, .. } => *timestamp,
        }
    }

    fn id(&self) -> &str {
        match self {
            FavoriteEntry::Route { id, .. } => id,
            FavoriteEntry::Stop { id, .. } => id,
        }
    }

    fn set_id(&mut self, new_id: String) {
        match self {
            FavoriteEntry::Route { id, .. } => *id = new_id,
            FavoriteEntry::Stop { id, .. } => *id = new_id,
        }
    }

    fn set_timestamp(&mut self, new_timestamp: i64) {
        match self {
            FavoriteEntry::Route { timestamp, .. } => *timestamp = new_timestamp,
            FavoriteEntry::Stop { timestamp, .. } => *timestamp = new_timestamp,
        }
    }
}

/// CRUD over the persisted favorites list
#[derive(Clone)]
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
}

impl Favorites {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns all favorites, newest first, migrating legacy entries.
    ///
    /// If migration changed anything the repaired list is persisted
    /// immediately, so the migration runs at most once per legacy entry.
    pub fn list(&self) -> Vec<FavoriteEntry> {
        let (entries, migrated) = self.load();
        if migrated {
            self.persist(&entries);
        }
        entries
    }

    /// Saves a route favorite. Returns false if it already exists.
    pub fn add_route(&self, route_name: &str, route_long_name: &str) -> bool {
        self.add(FavoriteEntry::Route {
            route_name: route_name.to_string(),
            route_long_name: route_long_name.to_string(),
            timestamp: 0,
            id: String::new(),
        })
    }

    /// Saves a stop favorite. Returns false if it already exists.
    pub fn add_stop(
        &self,
        route_name: &str,
        route_long_name: &str,
        stop_name: &str,
        direction: Direction,
        day_type: DayType,
    ) -> bool {
        self.add(FavoriteEntry::Stop {
            route_name: route_name.to_string(),
            route_long_name: route_long_name.to_string(),
            stop_name: stop_name.to_string(),
            direction,
            day_type,
            timestamp: 0,
            id: String::new(),
        })
    }

    /// Prepends `entry` unless a favorite with the same key exists.
    fn add(&self, mut entry: FavoriteEntry) -> bool {
        let (mut entries, _) = self.load();
        let key = entry.key();
        if entries.iter().any(|existing| existing.key() == key) {
            return false;
        }
        entry.set_id(key.id());
        entry.set_timestamp(Utc::now().timestamp_millis());
        entries.insert(0, entry);
        self.persist(&entries)
    }

    /// Removes the favorite with the given key.
    ///
    /// Returns true whether or not anything matched; false only when the
    /// updated list could not be written.
    pub fn remove(&self, key: &FavoriteKey) -> bool {
        let (mut entries, _) = self.load();
        entries.retain(|entry| entry.key() != *key);
        self.persist(&entries)
    }

    /// True iff a stop favorite matches all four fields exactly.
    pub fn is_favorite(
        &self,
        route_name: &str,
        stop_name: &str,
        direction: Direction,
        day_type: DayType,
    ) -> bool {
        let key = FavoriteKey::Stop {
            route: route_name.to_string(),
            stop: stop_name.to_string(),
            direction,
            day_type,
        };
        let (entries, _) = self.load();
        entries.iter().any(|entry| entry.key() == key)
    }

    /// True iff the whole route is saved as a favorite.
    pub fn is_favorite_route(&self, route_name: &str) -> bool {
        let key = FavoriteKey::Route {
            route: route_name.to_string(),
        };
        let (entries, _) = self.load();
        entries.iter().any(|entry| entry.key() == key)
    }

    /// Removes every favorite.
    pub fn clear(&self) -> bool {
        self.store.remove(FAVORITES_KEY);
        true
    }

    /// Reads and migrates the stored array.
    ///
    /// Entries without a `type` discriminator get `"stop"` when they carry a
    /// `stop_name`, else `"route"`; entries without an id get one derived
    /// from their key. The bool reports whether anything was repaired.
    fn load(&self) -> (Vec<FavoriteEntry>, bool) {
        let Some(raw) = self.store.get(FAVORITES_KEY) else {
            return (Vec::new(), false);
        };
        let Ok(values) = serde_json::from_str::<Vec<Value>>(&raw) else {
            return (Vec::new(), false);
        };

        let mut entries = Vec::new();
        let mut changed = false;
        for mut value in values {
            if let Some(object) = value.as_object_mut() {
                if !object.contains_key("type") {
                    let variant = if object.contains_key("stop_name") {
                        "stop"
                    } else {
                        "route"
                    };
                    object.insert("type".to_string(), json!(variant));
                    changed = true;
                }
            }
            // Unreadable entries are skipped rather than failing the list
            if let Ok(mut entry) = serde_json::from_value::<FavoriteEntry>(value) {
                if entry.id().is_empty() {
                    let id = entry.key().id();
                    entry.set_id(id);
                    changed = true;
                }
                entries.push(entry);
            }
        }
        (entries, changed)
    }

    fn persist(&self, entries: &[FavoriteEntry]) -> bool {
        match serde_json::to_string(entries) {
            Ok(serialized) => {
                self.store.set(FAVORITES_KEY, &serialized);
                true
            }
            Err(_) => false,
        }
    }
}
