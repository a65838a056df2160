// ── Persistent collaborators ──
//
// The credential store and the network directory source are owned by
// whatever embeds the resolver (a database, a settings file, ...). Core
// only needs these two read operations. In-memory implementations live
// here for embedding and tests; file-backed ones live in netid-config.

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;

use netid_api::ApiCredential;

use crate::directory::NetworkEntry;
use crate::error::CoreError;

/// Supplies the lookup API credential on demand.
///
/// Called once at start-up and again on every credential refresh, so
/// implementations should read the current value from their backing
/// store each time rather than caching it.
pub trait CredentialStore: Send + Sync {
    fn load_credential(&self) -> impl Future<Output = Result<ApiCredential, CoreError>> + Send;
}

/// Supplies the complete current set of known-valid networks.
///
/// Every call must return the full set; the directory replaces its
/// snapshot with whatever comes back.
pub trait NetworkDirectorySource: Send + Sync {
    fn load_networks(&self) -> impl Future<Output = Result<Vec<NetworkEntry>, CoreError>> + Send;
}

impl<T: CredentialStore> CredentialStore for Arc<T> {
    fn load_credential(&self) -> impl Future<Output = Result<ApiCredential, CoreError>> + Send {
        (**self).load_credential()
    }
}

impl<T: NetworkDirectorySource> NetworkDirectorySource for Arc<T> {
    fn load_networks(&self) -> impl Future<Output = Result<Vec<NetworkEntry>, CoreError>> + Send {
        (**self).load_networks()
    }
}

// ── In-memory implementations ────────────────────────────────────────

/// A credential store holding one replaceable value in memory.
pub struct StaticCredentialStore {
    credential: ArcSwap<ApiCredential>,
}

impl StaticCredentialStore {
    pub fn new(credential: ApiCredential) -> Self {
        Self {
            credential: ArcSwap::from_pointee(credential),
        }
    }

    /// Replace the stored credential (simulates rotation in the backing store).
    pub fn set(&self, credential: ApiCredential) {
        self.credential.store(Arc::new(credential));
    }
}

impl CredentialStore for StaticCredentialStore {
    async fn load_credential(&self) -> Result<ApiCredential, CoreError> {
        Ok(ApiCredential::clone(&self.credential.load()))
    }
}

/// A directory source holding one replaceable network list in memory.
pub struct StaticDirectorySource {
    networks: ArcSwap<Vec<NetworkEntry>>,
}

impl StaticDirectorySource {
    pub fn new(networks: Vec<NetworkEntry>) -> Self {
        Self {
            networks: ArcSwap::from_pointee(networks),
        }
    }

    /// Replace the full network list (simulates provisioning).
    pub fn replace(&self, networks: Vec<NetworkEntry>) {
        self.networks.store(Arc::new(networks));
    }
}

impl NetworkDirectorySource for StaticDirectorySource {
    async fn load_networks(&self) -> Result<Vec<NetworkEntry>, CoreError> {
        Ok(Vec::clone(&self.networks.load()))
    }
}
