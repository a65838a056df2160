//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netid_config::ConfigError;
use netid_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lookup API ───────────────────────────────────────────────────
    #[error("Could not reach the lookup API")]
    #[diagnostic(
        code(netid::connection_failed),
        help(
            "Check that the lookup API is reachable and api.url is correct.\n\
             Cause: {message}"
        )
    )]
    ConnectionFailed { message: String },

    #[error("The lookup API rejected the configured credentials")]
    #[diagnostic(
        code(netid::auth_failed),
        help(
            "The credential was reloaded once and still refused.\n\
             Update the password in the settings file, or run:\n  \
             netid config set-password --username <USER>"
        )
    )]
    AuthFailed { message: String },

    #[error("Lookup for {msisdn} failed with status '{status}'")]
    #[diagnostic(code(netid::lookup_failed), help("Response body:\n{body}"))]
    LookupFailed {
        msisdn: String,
        status: String,
        body: String,
    },

    #[error("Network {network_id} returned for {msisdn} is not a known network")]
    #[diagnostic(
        code(netid::unknown_network),
        help("Run: netid networks to see the known networks")
    )]
    UnknownNetwork { msisdn: String, network_id: String },

    // ── Collaborators ────────────────────────────────────────────────
    #[error("Could not load API credentials")]
    #[diagnostic(
        code(netid::no_credentials),
        help(
            "{message}\n\
             Set credentials.path in the config file, or NETID_API_USERNAME and NETID_API_PASSWORD."
        )
    )]
    NoCredentials { message: String },

    #[error("Could not load the network directory")]
    #[diagnostic(code(netid::directory), help("{message}"))]
    Directory { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No lookup API URL configured")]
    #[diagnostic(
        code(netid::no_config),
        help(
            "Create a config with: netid config init --url <URL>\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Config file already exists: {path}")]
    #[diagnostic(code(netid::conflict), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(netid::config))]
    Config(ConfigError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netid::validation))]
    Validation { field: String, reason: String },

    // ── Aggregate ────────────────────────────────────────────────────
    #[error("{failed} of {total} lookups failed")]
    #[diagnostic(code(netid::partial), help("Re-run with -v for details."))]
    PartialFailure { failed: usize, total: usize },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Failed to render output: {message}")]
    #[diagnostic(code(netid::output))]
    Render { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::UnknownNetwork { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a resolution failure for `msisdn`.
    pub fn from_lookup(msisdn: &str, err: CoreError) -> Self {
        match err {
            CoreError::InvalidResponse { status, body } => Self::LookupFailed {
                msisdn: msisdn.to_owned(),
                status,
                body,
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },

            CoreError::InvalidResponse { status, body } => CliError::LookupFailed {
                msisdn: "(unknown)".into(),
                status,
                body,
            },

            CoreError::Transport { message, .. } => CliError::ConnectionFailed { message },

            CoreError::UnknownNetwork { msisdn, network_id } => {
                CliError::UnknownNetwork { msisdn, network_id }
            }

            CoreError::CredentialStore { message } => CliError::NoCredentials { message },

            CoreError::DirectorySource { message } => CliError::Directory { message },

            CoreError::Config { message } => CliError::Validation {
                field: "api.url".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoApiUrl => CliError::NoConfig {
                path: netid_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
