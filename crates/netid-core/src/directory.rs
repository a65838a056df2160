// ── Network directory ──
//
// Known-valid networks, held as an immutable snapshot behind an `ArcSwap`.
// A reload builds a complete new snapshot and swaps it in; readers holding
// the old one keep a consistent view until they drop it.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::source::NetworkDirectorySource;

/// One known-valid network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Network identifier (MCC+MNC), e.g. `"24001"`.
    pub id: String,
    /// Operator name.
    pub name: String,
    /// Country the network belongs to.
    pub country: String,
}

impl NetworkEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: country.into(),
        }
    }
}

/// An immutable, complete view of the directory.
#[derive(Debug, Default)]
pub struct DirectorySnapshot {
    networks: HashMap<String, NetworkEntry>,
}

impl DirectorySnapshot {
    /// Build a snapshot. On duplicate identifiers the first entry is kept.
    pub fn from_entries(entries: impl IntoIterator<Item = NetworkEntry>) -> Self {
        let mut networks = HashMap::new();
        for entry in entries {
            networks.entry(entry.id.clone()).or_insert(entry);
        }
        Self { networks }
    }

    pub fn contains(&self, network_id: &str) -> bool {
        self.networks.contains_key(network_id)
    }

    pub fn get(&self, network_id: &str) -> Option<&NetworkEntry> {
        self.networks.get(network_id)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Entries sorted by identifier.
    pub fn entries(&self) -> Vec<&NetworkEntry> {
        let mut entries: Vec<_> = self.networks.values().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }
}

/// Directory of known-valid networks, reloadable as a whole.
pub struct NetworkDirectory<S> {
    source: S,
    snapshot: ArcSwap<DirectorySnapshot>,
}

impl<S: NetworkDirectorySource> NetworkDirectory<S> {
    /// Build a directory and populate it from `source`.
    pub async fn load(source: S) -> Result<Self, CoreError> {
        let entries = source.load_networks().await?;
        let snapshot = DirectorySnapshot::from_entries(entries);
        info!(networks = snapshot.len(), "network directory loaded");
        Ok(Self {
            source,
            snapshot: ArcSwap::from_pointee(snapshot),
        })
    }

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        self.snapshot.load_full()
    }

    /// Membership check against the current snapshot only.
    pub fn contains(&self, network_id: &str) -> bool {
        self.snapshot.load().contains(network_id)
    }

    /// Look up a network's details in the current snapshot.
    pub fn get(&self, network_id: &str) -> Option<NetworkEntry> {
        self.snapshot.load().get(network_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }

    /// Replace the snapshot with a freshly loaded complete set.
    ///
    /// On a source failure the previous snapshot stays in place.
    pub async fn reload(&self) -> Result<Arc<DirectorySnapshot>, CoreError> {
        let entries = self.source.load_networks().await?;
        let snapshot = Arc::new(DirectorySnapshot::from_entries(entries));
        self.snapshot.store(Arc::clone(&snapshot));
        info!(networks = snapshot.len(), "network directory reloaded");
        Ok(snapshot)
    }

    /// Check that `network_id` is known, reloading once on a miss.
    ///
    /// A hit on the current snapshot costs nothing; a miss triggers exactly
    /// one reload and the answer comes from the new snapshot.
    pub async fn validate(&self, network_id: &str) -> Result<bool, CoreError> {
        if self.contains(network_id) {
            return Ok(true);
        }

        debug!(network_id, "network not in directory, reloading");
        let snapshot = self.reload().await?;
        Ok(snapshot.contains(network_id))
    }
}
