// ── Identity cache ──
//
// Subscriber identifier -> network identifier, with a freshness window.
// Entries are replaced whole on every write and never evicted. Concurrent
// misses for the same key each run their own lookup; the later write wins.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::config::CacheExpiry;
use crate::error::CoreError;
use crate::resolver::NetworkIdLookup;

/// A cached resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub network_id: String,
    /// When the entry was last written.
    pub refreshed_at: Instant,
}

/// Concurrent subscriber → network cache.
///
/// With [`CacheExpiry::Sliding`] a hit restamps the entry, so a subscriber
/// seen at least once per TTL is never looked up again.
pub struct IdentityCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    expiry: CacheExpiry,
}

impl IdentityCache {
    pub fn new(ttl: Duration, expiry: CacheExpiry) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            expiry,
        }
    }

    /// Inspect an entry without touching its timestamp.
    pub fn peek(&self, msisdn: &str) -> Option<CacheEntry> {
        self.entries.get(msisdn).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `msisdn`, serving a fresh entry or falling back to `lookup`.
    ///
    /// A lookup failure propagates unchanged and leaves the cache untouched.
    pub async fn resolve<L: NetworkIdLookup>(
        &self,
        msisdn: &str,
        lookup: &L,
    ) -> Result<String, CoreError> {
        let now = Instant::now();
        // The map guard must not outlive this statement: the insert below
        // would deadlock on the same shard.
        let cached = self
            .entries
            .get(msisdn)
            .filter(|entry| now.duration_since(entry.refreshed_at) < self.ttl)
            .map(|entry| entry.network_id.clone());

        if let Some(network_id) = cached {
            debug!(msisdn, network_id = %network_id, "cache hit");
            if self.expiry == CacheExpiry::Sliding {
                self.store(msisdn, &network_id, now);
            }
            return Ok(network_id);
        }

        debug!(msisdn, "cache miss or stale entry");
        let network_id = lookup.lookup(msisdn).await?;
        self.store(msisdn, &network_id, Instant::now());
        debug!(msisdn, network_id = %network_id, "cache entry refreshed");
        Ok(network_id)
    }

    fn store(&self, msisdn: &str, network_id: &str, at: Instant) {
        self.entries.insert(
            msisdn.to_owned(),
            CacheEntry {
                network_id: network_id.to_owned(),
                refreshed_at: at,
            },
        );
    }
}
