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

//! One-shot remote address initializer.
//!
//! Reads the `remote` query parameter from the launch location and seeds the
//! shared configuration store with it.

use log::{debug, info};

use crate::store::{ConfigStore, REMOTE_ADDRESS_KEY};

/// Query parameter carrying the remote address.
pub const REMOTE_PARAM: &str = "remote";

/// Extract the raw query string from a location.
///
/// Accepts a full URL (`app://host/path?a=b#frag`), a bare `?a=b`, or a bare
/// `a=b`. The fragment is never part of the query.
fn query_string(location: &str) -> &str {
    let without_fragment = location.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None if without_fragment.contains('=') => without_fragment,
        None => "",
    }
}

/// Find the value of `name` in `location`'s query string, verbatim.
///
/// Values are not percent-decoded. The first occurrence wins.
#[must_use]
pub fn query_param<'a>(location: &'a str, name: &str) -> Option<&'a str> {
    query_string(location)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Write the `remote` parameter of `location` into the store.
///
/// Absent or empty parameters leave the store untouched. Returns `true` when
/// a value was written.
pub fn apply_remote_param(location: &str, store: &dyn ConfigStore) -> bool {
    match query_param(location, REMOTE_PARAM) {
        Some(remote) if !remote.is_empty() => {
            info!("Remote address set from launch location: {}", remote);
            store.set(REMOTE_ADDRESS_KEY, remote);
            true
        }
        _ => {
            debug!("No remote parameter in launch location");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_remote_param_overwrites_existing() {
        let store = MemoryStore::with_entries([(REMOTE_ADDRESS_KEY, "http://localhost:3000")]);

        assert!(apply_remote_param("?remote=http://example.com:9999", &store));
        assert_eq!(
            store.get(REMOTE_ADDRESS_KEY).as_deref(),
            Some("http://example.com:9999")
        );
    }

    #[test]
    fn test_missing_param_leaves_store_untouched() {
        let store = MemoryStore::with_entries([(REMOTE_ADDRESS_KEY, "http://localhost:3000")]);

        assert!(!apply_remote_param("app://local/?view=agents", &store));
        assert_eq!(
            store.get(REMOTE_ADDRESS_KEY).as_deref(),
            Some("http://localhost:3000")
        );

        let empty = MemoryStore::new();
        assert!(!apply_remote_param("", &empty));
        assert_eq!(empty.get(REMOTE_ADDRESS_KEY), None);
    }

    #[test]
    fn test_empty_param_is_not_written() {
        let store = MemoryStore::new();
        assert!(!apply_remote_param("?remote=&x=1", &store));
        assert_eq!(store.get(REMOTE_ADDRESS_KEY), None);
    }

    #[test]
    fn test_full_url_with_other_params() {
        let location = "app://local/dashboard?theme=dark&remote=http://10.0.0.5:3000#top";
        assert_eq!(query_param(location, REMOTE_PARAM), Some("http://10.0.0.5:3000"));
        assert_eq!(query_param(location, "theme"), Some("dark"));
        assert_eq!(query_param(location, "missing"), None);
    }

    #[test]
    fn test_value_is_kept_verbatim() {
        let store = MemoryStore::new();
        apply_remote_param("remote=http%3A%2F%2Fhost%3A1", &store);
        assert_eq!(
            store.get(REMOTE_ADDRESS_KEY).as_deref(),
            Some("http%3A%2F%2Fhost%3A1")
        );
    }

    #[test]
    fn test_idempotent_for_same_location() {
        let store = MemoryStore::new();
        apply_remote_param("?remote=http://a:1", &store);
        apply_remote_param("?remote=http://a:1", &store);
        assert_eq!(store.get(REMOTE_ADDRESS_KEY).as_deref(), Some("http://a:1"));
    }
}
