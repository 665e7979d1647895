// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Key-value configuration store shared between the initializer and monitor.
//!
//! Components never reach for a global: they are handed an `Arc<dyn ConfigStore>`
//! so the backing storage can be swapped for [`MemoryStore`] in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store key holding the user-configured agent service address.
pub const REMOTE_ADDRESS_KEY: &str = "remoteAddress";

/// Address used when nothing has been configured yet.
pub const DEFAULT_REMOTE_ADDRESS: &str = "http://localhost:3000";

/// Synchronous string key-value store.
///
/// Implementations must be safe to share across threads; the polling task
/// and the UI thread may hold the same store.
pub trait ConfigStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Writes never fail from the caller's point of view. Durable stores
    /// that cannot persist must still keep the value in memory.
    fn set(&self, key: &str, value: &str);
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }
}

/// Process-local in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .map(|values| values.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

/// Read the configured remote address, falling back to [`DEFAULT_REMOTE_ADDRESS`].
#[must_use]
pub fn remote_address_or_default(store: &dyn ConfigStore) -> String {
    store
        .get(REMOTE_ADDRESS_KEY)
        .unwrap_or_else(|| DEFAULT_REMOTE_ADDRESS.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get(REMOTE_ADDRESS_KEY), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let store = MemoryStore::with_entries([(REMOTE_ADDRESS_KEY, "http://localhost:3000")]);
        store.set(REMOTE_ADDRESS_KEY, "http://example.com:9999");
        assert_eq!(
            store.get(REMOTE_ADDRESS_KEY).as_deref(),
            Some("http://example.com:9999")
        );
    }

    #[test]
    fn test_default_address_fallback() {
        let store = MemoryStore::new();
        assert_eq!(remote_address_or_default(&store), "http://localhost:3000");

        store.set(REMOTE_ADDRESS_KEY, "  not a url ");
        assert_eq!(remote_address_or_default(&store), "  not a url ");
    }

    #[test]
    fn test_shared_through_arc() {
        let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());
        let other = Arc::clone(&store);
        store.set("k", "v");
        assert_eq!(other.get("k").as_deref(), Some("v"));
    }
}
