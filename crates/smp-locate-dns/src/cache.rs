//! Lookaside cache for NAPTR resolution results.
//!
//! No TTL, no eviction and no negative caching: an entry lives until
//! [`DnsCache::clear`] is called. Failed resolutions are never stored.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// Thread-safe map from resolution key to resolved URL.
#[derive(Debug, Default)]
pub struct DnsCache {
    entries: RwLock<HashMap<String, String>>,
}

impl DnsCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the key for a resolution of `domain` for `service` via the
    /// optional primary DNS server.
    #[must_use]
    pub fn key(domain: &str, service: &str, primary_dns_server: Option<&str>) -> String {
        format!("{domain}|{service}|{}", primary_dns_server.unwrap_or_default())
    }

    /// Previously resolved value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let hit = self.entries.read().get(key).cloned();
        if hit.is_some() {
            trace!(key, "dns cache hit");
        }
        hit
    }

    /// Store a resolved value, replacing any previous one
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key.into(), value.into());
    }

    /// Copy of all entries
    #[must_use]
    pub fn get_all(&self) -> HashMap<String, String> {
        self.entries.read().clone()
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        trace!(count = entries.len(), "clearing dns cache");
        entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
