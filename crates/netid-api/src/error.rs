use thiserror::Error;

/// Top-level error type for the `netid-api` crate.
///
/// Covers every failure mode of a single lookup round-trip: rejected
/// credentials, transport, unexpected HTTP status, and body parsing.
/// `netid-core` maps these into resolution errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API answered HTTP 401 for the supplied credential.
    #[error("Unauthorized (HTTP 401) at {url}")]
    Unauthorized { url: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-success status other than 401.
    #[error("Unexpected HTTP {status} from lookup API")]
    Http { status: u16, body: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// XML body could not be parsed or lacks a required element,
    /// with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the API rejected the credential and a refresh
    /// might resolve it.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
