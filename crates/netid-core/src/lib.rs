//! Cached, self-validating subscriber network-identity resolution.
//!
//! This crate owns the resolution engine sitting between `netid-api` and
//! its consumers (the `netid` CLI, or a protocol server embedding it):
//!
//! - **[`NetworkIdProvider`]**: The single public operation,
//!   [`get_network_id()`](NetworkIdProvider::get_network_id), composing the
//!   cache, the remote resolver, and the directory.
//!
//! - **[`IdentityCache`]**: `DashMap`-backed subscriber → network map with
//!   sliding freshness. No eviction and no request coalescing.
//!
//! - **[`RemoteIdentityResolver`]**: One lookup against the remote API with
//!   a single credential-refresh retry on HTTP 401, followed by directory
//!   reconciliation.
//!
//! - **[`NetworkDirectory`]**: Snapshot of known-valid networks behind an
//!   `ArcSwap`, replaced wholesale on reload.
//!
//! - **[`CredentialManager`]**: The one shared API credential, swapped
//!   atomically on refresh.
//!
//! Persistent state lives behind the [`CredentialStore`] and
//! [`NetworkDirectorySource`] traits; `netid-config` provides file-backed
//! implementations.

pub mod cache;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod provider;
pub mod resolver;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheEntry, IdentityCache};
pub use config::{
    CacheExpiry, DEFAULT_CACHE_TTL, DirectoryPolicy, ResolverConfig, TlsVerification,
};
pub use credentials::CredentialManager;
pub use directory::{DirectorySnapshot, NetworkDirectory, NetworkEntry};
pub use error::CoreError;
pub use provider::NetworkIdProvider;
pub use resolver::{NetworkIdLookup, RemoteIdentityResolver};
pub use source::{
    CredentialStore, NetworkDirectorySource, StaticCredentialStore, StaticDirectorySource,
};

pub use netid_api::ApiCredential;
