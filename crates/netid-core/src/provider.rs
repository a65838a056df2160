// ── Resolution API ──
//
// The facade handed to protocol handlers: one call per inbound request,
// safe to share across tasks behind an `Arc`.

use tracing::debug;

use netid_api::LookupClient;

use crate::cache::IdentityCache;
use crate::config::ResolverConfig;
use crate::credentials::CredentialManager;
use crate::directory::{NetworkDirectory, NetworkEntry};
use crate::error::CoreError;
use crate::resolver::RemoteIdentityResolver;
use crate::source::{CredentialStore, NetworkDirectorySource};

/// Resolves subscriber identifiers to home-network identifiers.
///
/// Construction loads the API credential and the network directory up
/// front, so a provider that exists is ready to serve.
pub struct NetworkIdProvider<C, D> {
    cache: IdentityCache,
    resolver: RemoteIdentityResolver<C, D>,
}

impl<C: CredentialStore, D: NetworkDirectorySource> NetworkIdProvider<C, D> {
    /// Build a provider from `config`, creating the HTTP client from its
    /// transport settings.
    pub async fn connect(
        config: &ResolverConfig,
        credentials: C,
        directory: D,
    ) -> Result<Self, CoreError> {
        let client = LookupClient::new(config.api_url.clone(), &config.transport())?;
        Self::with_client(config, client, credentials, directory).await
    }

    /// Build a provider around an existing lookup client.
    pub async fn with_client(
        config: &ResolverConfig,
        client: LookupClient,
        credentials: C,
        directory: D,
    ) -> Result<Self, CoreError> {
        let credentials = CredentialManager::load(credentials).await?;
        let directory = NetworkDirectory::load(directory).await?;

        Ok(Self {
            cache: IdentityCache::new(config.cache_ttl, config.cache_expiry),
            resolver: RemoteIdentityResolver::new(
                client,
                credentials,
                directory,
                config.directory_policy,
            ),
        })
    }

    /// Resolve the home network of `msisdn`.
    ///
    /// Fails rather than returning a sentinel; the caller decides what a
    /// failure means for its own request (e.g. reject the authentication).
    pub async fn get_network_id(&self, msisdn: &str) -> Result<String, CoreError> {
        debug!(msisdn, "getting network id");
        self.cache.resolve(msisdn, &self.resolver).await
    }

    /// Details of a network from the current directory snapshot.
    pub fn network(&self, network_id: &str) -> Option<NetworkEntry> {
        self.resolver.directory().get(network_id)
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn directory(&self) -> &NetworkDirectory<D> {
        self.resolver.directory()
    }
}
