// How the lookup client reaches the API: certificate checks, request
// deadline and the User-Agent header. `netid-core` derives one of these
// from its `ResolverConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// `User-Agent` sent when the deployment does not choose its own.
pub const DEFAULT_USER_AGENT: &str = concat!("netid/", env!("CARGO_PKG_VERSION"));

/// Server certificate checks for the lookup endpoint.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Platform root store.
    #[default]
    System,
    /// Also trust the PEM certificate at this path.
    CustomCa(PathBuf),
    /// No verification at all.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Deadline for one lookup, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        let builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(read_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }
}

fn read_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("CA certificate {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| {
        Error::Tls(format!(
            "CA certificate {} is not valid PEM: {e}",
            path.display()
        ))
    })
}
