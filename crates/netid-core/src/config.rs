// ── Runtime resolver configuration ──
//
// These types describe *how* to resolve: where the lookup API lives, how
// to reach it, and the cache and directory policies. They never touch
// disk. The CLI (via netid-config) constructs a `ResolverConfig` and hands
// it in.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use netid_api::{DEFAULT_USER_AGENT, TlsMode, TransportConfig};

/// How long a cache entry stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// When a cache entry's freshness clock is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheExpiry {
    /// Every successful resolution restamps the entry, hits included.
    #[default]
    Sliding,
    /// Only a fresh remote lookup stamps the entry.
    Fixed,
}

/// What to do with a resolved network that is missing from the directory
/// even after a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryPolicy {
    /// Log the miss and return the identifier anyway.
    #[default]
    Permissive,
    /// Fail the resolution with `CoreError::UnknownNetwork`.
    Strict,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab endpoints).
    DangerAcceptInvalid,
}

/// Configuration for one resolver instance.
///
/// Built by the CLI, passed to `NetworkIdProvider` -- core never reads
/// config files.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base endpoint; the subscriber identifier is appended verbatim.
    pub api_url: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout for the lookup API.
    pub timeout: Duration,
    /// `User-Agent` header on every lookup.
    pub user_agent: String,
    /// Freshness window of cache entries.
    pub cache_ttl: Duration,
    /// When cache entries are restamped.
    pub cache_expiry: CacheExpiry,
    /// Handling of networks missing from the directory.
    pub directory_policy: DirectoryPolicy,
}

impl ResolverConfig {
    /// A config for `api_url` with default tuning.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_expiry: CacheExpiry::default(),
            directory_policy: DirectoryPolicy::default(),
        }
    }

    /// Transport settings for the lookup client.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_legacy_behaviour() {
        let config = ResolverConfig::new("https://api.example.net/hlr?msisdn=");
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.cache_expiry, CacheExpiry::Sliding);
        assert_eq!(config.directory_policy, DirectoryPolicy::Permissive);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn transport_mirrors_tls_choice() {
        let mut config = ResolverConfig::new("https://api.example.net/");
        config.tls = TlsVerification::DangerAcceptInvalid;
        config.timeout = Duration::from_secs(5);
        config.user_agent = "hlr-gateway/2".into();

        let transport = config.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.user_agent, "hlr-gateway/2");
    }
}
