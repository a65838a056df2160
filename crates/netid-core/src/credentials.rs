// ── Shared API credential ──
//
// One credential value for every in-flight lookup. A refresh swaps in a
// freshly loaded value; calls that already read the old one keep using it.
// Concurrent refreshes are last-writer-wins.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use netid_api::ApiCredential;

use crate::error::CoreError;
use crate::source::CredentialStore;

/// Owner of the single current lookup API credential.
pub struct CredentialManager<S> {
    store: S,
    current: ArcSwap<ApiCredential>,
}

impl<S: CredentialStore> CredentialManager<S> {
    /// Load the initial credential from `store`.
    pub async fn load(store: S) -> Result<Self, CoreError> {
        let credential = store.load_credential().await?;
        debug!(username = %credential.username, "API credential loaded");
        Ok(Self {
            store,
            current: ArcSwap::from_pointee(credential),
        })
    }

    /// The credential to use for the next request.
    pub fn current(&self) -> Arc<ApiCredential> {
        self.current.load_full()
    }

    /// Reload the credential from the store and make it current.
    ///
    /// On a store failure the previous credential stays current.
    pub async fn refresh(&self) -> Result<Arc<ApiCredential>, CoreError> {
        let credential = match self.store.load_credential().await {
            Ok(credential) => Arc::new(credential),
            Err(e) => {
                warn!(error = %e, "failed to refresh API credential");
                return Err(e);
            }
        };
        self.current.store(Arc::clone(&credential));
        debug!(username = %credential.username, "API credential refreshed");
        Ok(credential)
    }
}
