// ── File-backed collaborators ──
//
// Both stores re-read their file on every load so that rotated credentials
// and newly provisioned networks are picked up without a restart.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, warn};

use netid_core::{ApiCredential, CoreError, CredentialStore, NetworkDirectorySource, NetworkEntry};

use crate::ConfigError;

/// Environment variable consulted for the API username when the settings
/// file has none.
pub const USERNAME_ENV: &str = "NETID_API_USERNAME";

/// Environment variable that overrides the API password.
pub const PASSWORD_ENV: &str = "NETID_API_PASSWORD";

const KEYRING_SERVICE: &str = "netid";

// ── Keyring ─────────────────────────────────────────────────────────

/// Blocking password storage keyed by API username.
///
/// Calls may block on the platform secret service; async callers run
/// them on the blocking pool.
pub trait PasswordVault: fmt::Debug + Send + Sync + 'static {
    /// `Ok(None)` when no password is stored for `username`.
    fn get_password(&self, username: &str) -> Result<Option<String>, keyring::Error>;

    fn set_password(&self, username: &str, password: &str) -> Result<(), keyring::Error>;
}

/// The platform keyring under service `netid`, account = username.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemKeyring;

impl PasswordVault for SystemKeyring {
    fn get_password(&self, username: &str) -> Result<Option<String>, keyring::Error> {
        match keyring::Entry::new(KEYRING_SERVICE, username)?.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_password(&self, username: &str, password: &str) -> Result<(), keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, username)?.set_password(password)
    }
}

/// Save `password` for `username` in `vault`, then read it back.
///
/// A vault that accepts the write but cannot return it yields
/// [`ConfigError::KeyringUnavailable`].
pub fn store_password(
    vault: &dyn PasswordVault,
    username: &str,
    password: &str,
) -> Result<(), ConfigError> {
    vault.set_password(username, password)?;
    match vault.get_password(username)? {
        Some(stored) if stored == password => {
            debug!(username, "API password stored in keyring");
            Ok(())
        }
        _ => Err(ConfigError::KeyringUnavailable {
            username: username.to_owned(),
        }),
    }
}

/// Save `password` for `username` in the system keyring, where
/// [`SettingsCredentialStore`] will find it on the next load.
pub fn store_keyring_password(username: &str, password: &str) -> Result<(), ConfigError> {
    store_password(&SystemKeyring, username, password)
}

// ── Credentials ─────────────────────────────────────────────────────

/// Reads the API credential from a TOML table of named settings:
///
/// ```toml
/// ApiUsername = "hlr-client"
/// ApiPassword = "s3cret"
/// ```
///
/// The password is taken from `NETID_API_PASSWORD`, then the system
/// keyring (service `netid`, account = username), then the settings file.
#[derive(Debug, Clone)]
pub struct SettingsCredentialStore {
    path: Option<PathBuf>,
    username_setting: String,
    password_setting: String,
    vault: Arc<dyn PasswordVault>,
}

impl SettingsCredentialStore {
    pub fn new(
        path: Option<PathBuf>,
        username_setting: impl Into<String>,
        password_setting: impl Into<String>,
    ) -> Self {
        Self {
            path,
            username_setting: username_setting.into(),
            password_setting: password_setting.into(),
            vault: Arc::new(SystemKeyring),
        }
    }

    /// Replace the system keyring with another password vault.
    pub fn with_vault(mut self, vault: Arc<dyn PasswordVault>) -> Self {
        self.vault = vault;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn read_settings(&self) -> Result<HashMap<String, String>, CoreError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(HashMap::new());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| store_error(path, &e))?;
        toml::from_str(&text).map_err(|e| store_error(path, &e))
    }
}

impl CredentialStore for SettingsCredentialStore {
    async fn load_credential(&self) -> Result<ApiCredential, CoreError> {
        let mut settings = self.read_settings().await?;

        let username = settings
            .remove(&self.username_setting)
            .or_else(|| std::env::var(USERNAME_ENV).ok())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CoreError::CredentialStore {
                message: format!(
                    "no API username: set {} in the settings file or {USERNAME_ENV}",
                    self.username_setting
                ),
            })?;

        // 1. Env var
        if let Ok(pw) = std::env::var(PASSWORD_ENV) {
            debug!(username = %username, "API password taken from environment");
            return Ok(credential(username, pw));
        }

        // 2. Keyring
        let vault = Arc::clone(&self.vault);
        let account = username.clone();
        match tokio::task::spawn_blocking(move || vault.get_password(&account)).await {
            Ok(Ok(Some(pw))) => {
                debug!(username = %username, "API password taken from keyring");
                return Ok(credential(username, pw));
            }
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                warn!(username = %username, error = %e, "keyring unavailable, trying settings file");
            }
            Err(e) => {
                return Err(CoreError::CredentialStore {
                    message: format!("keyring lookup for {username} did not complete: {e}"),
                });
            }
        }

        // 3. Settings file
        if let Some(pw) = settings.remove(&self.password_setting) {
            return Ok(credential(username, pw));
        }

        Err(CoreError::CredentialStore {
            message: format!(
                "no API password for {username}: set {PASSWORD_ENV}, a keyring entry, or {}",
                self.password_setting
            ),
        })
    }
}

fn credential(username: String, password: String) -> ApiCredential {
    ApiCredential {
        username,
        password: SecretString::from(password),
    }
}

fn store_error(path: &Path, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::CredentialStore {
        message: format!("{}: {err}", path.display()),
    }
}

// ── Network directory ───────────────────────────────────────────────

#[derive(Deserialize)]
struct NetworksFile {
    #[serde(default, rename = "network")]
    networks: Vec<NetworkEntry>,
}

/// Reads the known-network list from a TOML file of `[[network]]` tables:
///
/// ```toml
/// [[network]]
/// id = "24001"
/// name = "Telia"
/// country = "Sweden"
/// ```
#[derive(Debug, Clone)]
pub struct FileDirectorySource {
    path: PathBuf,
}

impl FileDirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NetworkDirectorySource for FileDirectorySource {
    async fn load_networks(&self) -> Result<Vec<NetworkEntry>, CoreError> {
        let failed = |e: &dyn std::fmt::Display| CoreError::DirectorySource {
            message: format!("{}: {e}", self.path.display()),
        };

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| failed(&e))?;
        let file: NetworksFile = toml::from_str(&text).map_err(|e| failed(&e))?;
        debug!(path = %self.path.display(), count = file.networks.len(), "read network directory");
        Ok(file.networks)
    }
}
