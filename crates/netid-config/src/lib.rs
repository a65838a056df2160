//! Shared configuration for the netid resolver.
//!
//! TOML config loading (file + `NETID_` environment), translation to
//! `netid_core::ResolverConfig`, and the file-backed implementations of the
//! credential store and network directory source.

mod stores;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netid_core::{CacheExpiry, DirectoryPolicy, ResolverConfig, TlsVerification};

pub use stores::{
    FileDirectorySource, PASSWORD_ENV, PasswordVault, SettingsCredentialStore, SystemKeyring,
    USERNAME_ENV, store_keyring_password, store_password,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no lookup API URL configured (set api.url or NETID_API__URL)")]
    NoApiUrl,

    #[error("no network directory configured (set directory.path)")]
    NoDirectory,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("keyring did not keep the password for {username}: no secret store is available")]
    KeyringUnavailable { username: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub directory: DirectorySettings,

    #[serde(default)]
    pub credentials: CredentialSettings,
}

/// The remote lookup API.
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiSettings {
    /// Base endpoint; the MSISDN is appended verbatim.
    pub url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Overrides the default `netid/<version>` User-Agent.
    pub user_agent: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            user_agent: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Freshness window in seconds.
    #[serde(default = "default_ttl")]
    pub ttl: u64,

    #[serde(default)]
    pub expiry: CacheExpiry,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            expiry: CacheExpiry::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DirectorySettings {
    /// TOML file listing known networks as `[[network]]` tables.
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub policy: DirectoryPolicy,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialSettings {
    /// TOML file of named settings holding the API username and password.
    pub path: Option<PathBuf>,

    #[serde(default = "default_username_setting")]
    pub username_setting: String,

    #[serde(default = "default_password_setting")]
    pub password_setting: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            path: None,
            username_setting: default_username_setting(),
            password_setting: default_password_setting(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_ttl() -> u64 {
    30
}
fn default_username_setting() -> String {
    "ApiUsername".into()
}
fn default_password_setting() -> String {
    "ApiPassword".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "netid", "netid").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netid");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETID_").split("__"));

    let mut config: Config = figment.extract()?;
    if let Some(base) = path.parent() {
        config.resolve_relative_paths(base);
    }
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Anchor relative store paths at the config file's directory.
    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [
            &mut self.directory.path,
            &mut self.credentials.path,
            &mut self.api.ca_cert,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Build a `ResolverConfig` from this config.
    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        let url = self.api.url.as_deref().ok_or(ConfigError::NoApiUrl)?;
        if url.trim().is_empty() {
            return Err(ConfigError::NoApiUrl);
        }

        if self.cache.ttl == 0 {
            return Err(ConfigError::Validation {
                field: "cache.ttl".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let tls = if self.api.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.api.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut resolver = ResolverConfig::new(url);
        resolver.tls = tls;
        resolver.timeout = Duration::from_secs(self.api.timeout);
        if let Some(ref agent) = self.api.user_agent {
            resolver.user_agent.clone_from(agent);
        }
        resolver.cache_ttl = Duration::from_secs(self.cache.ttl);
        resolver.cache_expiry = self.cache.expiry;
        resolver.directory_policy = self.directory.policy;
        Ok(resolver)
    }

    /// The credential store described by `[credentials]`.
    pub fn credential_store(&self) -> SettingsCredentialStore {
        SettingsCredentialStore::new(
            self.credentials.path.clone(),
            self.credentials.username_setting.clone(),
            self.credentials.password_setting.clone(),
        )
    }

    /// The directory source described by `[directory]`.
    pub fn directory_source(&self) -> Result<FileDirectorySource, ConfigError> {
        let path = self.directory.path.clone().ok_or(ConfigError::NoDirectory)?;
        Ok(FileDirectorySource::new(path))
    }
}
