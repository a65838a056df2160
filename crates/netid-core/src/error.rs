// ── Core error types ──
//
// Resolution errors from netid-core. Consumers never see reqwest or XML
// parser errors directly; the `From<netid_api::Error>` impl translates
// wire-level failures into resolution-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote lookup ────────────────────────────────────────────────
    /// The lookup API kept answering 401 after a credential refresh.
    #[error("Lookup API rejected credentials: {message}")]
    Unauthorized { message: String },

    /// The lookup API answered, but with a status other than "ok".
    #[error("Lookup API returned status '{status}'")]
    InvalidResponse {
        status: String,
        /// Full response body, for diagnostics.
        body: String,
    },

    /// Any other failure reaching or understanding the lookup API.
    #[error("Lookup API request failed: {message}")]
    Transport {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    /// Only produced under `DirectoryPolicy::Strict`.
    #[error("Network {network_id} resolved for {msisdn} is not in the directory")]
    UnknownNetwork { msisdn: String, network_id: String },

    // ── Collaborators ────────────────────────────────────────────────
    #[error("Credential store error: {message}")]
    CredentialStore { message: String },

    #[error("Network directory source error: {message}")]
    DirectorySource { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netid_api::Error> for CoreError {
    fn from(err: netid_api::Error) -> Self {
        match err {
            netid_api::Error::Unauthorized { url } => CoreError::Unauthorized {
                message: format!("HTTP 401 from {url}"),
            },
            netid_api::Error::Transport(ref e) => CoreError::Transport {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            netid_api::Error::Http { status, body } => CoreError::Transport {
                message: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                },
                status: Some(status),
            },
            netid_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid lookup URL: {e}"),
            },
            netid_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            netid_api::Error::Deserialization { message, body: _ } => CoreError::Transport {
                message: format!("malformed response: {message}"),
                status: None,
            },
        }
    }
}
