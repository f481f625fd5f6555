//! Persisted key-value store for user state
//!
//! Everything the application remembers between sessions (cached API
//! responses, favorites, theme preference) goes through the `KeyValueStore`
//! trait. Production binds it to `FileStore` (one file per key in an
//! XDG-compliant data directory); tests bind it to `MemoryStore`.

use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Synchronous string key-value storage.
///
/// Implementations must never panic or propagate I/O errors: a failed read
/// degrades to `None`, a failed write to a no-op. Callers stay correct even
/// if persistence is entirely unavailable.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str);
    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str);
    /// Returns all keys currently present in the store.
    fn list_keys(&self) -> Vec<String>;
}

/// File-backed store keeping one file per key
///
/// Lives in the XDG data directory (`~/.local/share/marshrut/` on Linux).
/// Keys may contain arbitrary characters, so filenames use a reversible
/// percent-style encoding and `list_keys` decodes them back.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where entries are stored
    dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the XDG-compliant data directory.
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "marshrut")?;
        let dir = project_dirs.data_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Creates a FileStore rooted at a custom directory (for tests).
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(encode_key(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        let _ = fs::write(self.path_for(key), value);
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }

    fn list_keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| {
                let name = entry.ok()?.file_name();
                decode_key(name.to_str()?)
            })
            .collect()
    }
}

/// In-memory store for deterministic unit tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    fn list_keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

/// Encodes a key into a filesystem-safe filename.
///
/// Alphanumerics plus `.`, `_` and `-` pass through; everything else becomes
/// `%XX` (uppercase hex), including `%` itself so decoding is unambiguous.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    encoded
}

/// Decodes a filename produced by `encode_key` back into the original key.
///
/// Returns `None` for names that are not valid encodings (stray files in the
/// store directory are skipped rather than surfaced as bogus keys).
fn decode_key(name: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(name.len());
    let mut chars = name.bytes();
    while let Some(byte) = chars.next() {
        if byte == b'%' {
            let hi = chars.next()?;
            let lo = chars.next()?;
            let hex = [hi, lo];
            let hex = std::str::from_utf8(&hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
        } else {
            bytes.push(byte);
        }
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_file_store_set_then_get() {
        let (store, _temp_dir) = create_test_store();

        store.set("favorites", "[]");

        assert_eq!(store.get("favorites").as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_store_get_missing_returns_none() {
        let (store, _temp_dir) = create_test_store();

        assert!(store.get("nonexistent").is_none());
    }

    #[test]
    fn test_file_store_remove() {
        let (store, _temp_dir) = create_test_store();

        store.set("theme", "black");
        store.remove("theme");

        assert!(store.get("theme").is_none());
    }

    #[test]
    fn test_file_store_remove_missing_is_noop() {
        let (store, _temp_dir) = create_test_store();

        // Should not panic or error
        store.remove("never_existed");
    }

    #[test]
    fn test_file_store_overwrite() {
        let (store, _temp_dir) = create_test_store();

        store.set("theme", "black");
        store.set("theme", "white");

        assert_eq!(store.get("theme").as_deref(), Some("white"));
    }

    #[test]
    fn test_file_store_roundtrips_keys_with_special_characters() {
        let (store, _temp_dir) = create_test_store();
        let key = "cache:/api/route/12/schedule{\"direction\":\"0\"}";

        store.set(key, "data");

        assert_eq!(store.get(key).as_deref(), Some("data"));
        let keys = store.list_keys();
        assert_eq!(keys, vec![key.to_string()]);
    }

    #[test]
    fn test_file_store_list_keys() {
        let (store, _temp_dir) = create_test_store();

        store.set("cache:a", "1");
        store.set("cache:b", "2");
        store.set("favorites", "[]");

        let mut keys = store.list_keys();
        keys.sort();
        assert_eq!(keys, vec!["cache:a", "cache:b", "favorites"]);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();

        store.set("key", "value");
        assert_eq!(store.get("key").as_deref(), Some("value"));

        store.remove("key");
        assert!(store.get("key").is_none());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let keys = [
            "plain",
            "cache:/api/routes{}",
            "кириллица",
            "spaces and %percent%",
        ];
        for key in keys {
            let encoded = encode_key(key);
            assert!(
                encoded
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'-' || b == b'%'),
                "encoded name should be filesystem-safe: {}",
                encoded
            );
            assert_eq!(decode_key(&encoded).as_deref(), Some(key));
        }
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.dir.to_string_lossy();
            assert!(
                path_str.contains("marshrut"),
                "Store path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
