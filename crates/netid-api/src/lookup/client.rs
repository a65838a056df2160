// Lookup API HTTP client
//
// Wraps `reqwest::Client` with the lookup endpoint's URL construction
// (base endpoint + subscriber identifier), Basic auth, status mapping,
// and XML body parsing. Credentials are passed per call; this client
// never holds or refreshes them.

use secrecy::ExposeSecret;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ApiCredential;
use crate::error::Error;
use crate::lookup::models::LookupResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for the network-identity lookup API.
///
/// Every call is a single round-trip: no retries and no credential
/// handling beyond attaching the supplied pair. HTTP 401 is surfaced as
/// [`Error::Unauthorized`] so callers can decide whether to refresh.
pub struct LookupClient {
    http: reqwest::Client,
    base_url: String,
}

impl LookupClient {
    /// Create a new lookup client from a `TransportConfig`.
    ///
    /// `base_url` is used verbatim as a prefix: the subscriber identifier is
    /// appended directly (e.g. `https://api.example.net/lookup?msisdn=`).
    pub fn new(base_url: impl Into<String>, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url)
    }

    /// Create a lookup client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Result<Self, Error> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;
        Ok(Self { http, base_url })
    }

    /// The configured base endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request URL for a subscriber identifier.
    pub fn request_url(&self, msisdn: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{msisdn}", self.base_url))?)
    }

    /// Look up the home network of `msisdn`.
    ///
    /// Returns the parsed response whatever its `message` status; deciding
    /// what a non-"ok" status means is left to the caller.
    pub async fn lookup(
        &self,
        msisdn: &str,
        credential: &ApiCredential,
    ) -> Result<LookupResponse, Error> {
        let url = self.request_url(msisdn)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url.clone())
            .basic_auth(
                &credential.username,
                Some(credential.password.expose_secret()),
            )
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                url: url.to_string(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(body = %body, "lookup response");

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        LookupResponse::parse(&body)
    }
}
