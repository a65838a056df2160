// ── Remote identity resolver ──
//
// One resolution = one lookup, plus at most one retry after a credential
// refresh when the API answers 401. Each attempt is classified into a
// tagged `Attempt` so the retry policy is a plain match. Successful
// answers are reconciled against the network directory.

use std::future::Future;

use tracing::{debug, error, warn};

use netid_api::{LookupClient, LookupResponse};

use crate::config::DirectoryPolicy;
use crate::credentials::CredentialManager;
use crate::directory::NetworkDirectory;
use crate::error::CoreError;
use crate::source::{CredentialStore, NetworkDirectorySource};

/// Anything that can turn a subscriber identifier into a network identifier.
///
/// The cache is written against this trait rather than the concrete
/// resolver.
pub trait NetworkIdLookup: Send + Sync {
    fn lookup(&self, msisdn: &str) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Outcome of a single request against the lookup API.
#[derive(Debug)]
enum Attempt {
    /// The API answered with a parseable body (any status).
    Answered(LookupResponse),
    /// HTTP 401.
    Unauthorized,
    /// Anything else: transport, unexpected HTTP status, malformed body.
    Failed(CoreError),
}

/// Resolves subscriber identifiers against the remote lookup API.
pub struct RemoteIdentityResolver<C, D> {
    client: LookupClient,
    credentials: CredentialManager<C>,
    directory: NetworkDirectory<D>,
    policy: DirectoryPolicy,
}

impl<C: CredentialStore, D: NetworkDirectorySource> RemoteIdentityResolver<C, D> {
    pub fn new(
        client: LookupClient,
        credentials: CredentialManager<C>,
        directory: NetworkDirectory<D>,
        policy: DirectoryPolicy,
    ) -> Self {
        Self {
            client,
            credentials,
            directory,
            policy,
        }
    }

    pub fn directory(&self) -> &NetworkDirectory<D> {
        &self.directory
    }

    async fn attempt(&self, msisdn: &str) -> Attempt {
        let credential = self.credentials.current();
        match self.client.lookup(msisdn, &credential).await {
            Ok(response) => Attempt::Answered(response),
            Err(e) if e.is_unauthorized() => Attempt::Unauthorized,
            Err(e) => Attempt::Failed(e.into()),
        }
    }

    /// Run the request, refreshing credentials and retrying once on 401.
    async fn fetch(&self, msisdn: &str) -> Result<LookupResponse, CoreError> {
        let outcome = match self.attempt(msisdn).await {
            Attempt::Unauthorized => {
                warn!(msisdn, "lookup API answered 401, refreshing credentials and retrying");
                self.credentials.refresh().await?;
                self.attempt(msisdn).await
            }
            first => first,
        };

        match outcome {
            Attempt::Answered(response) => Ok(response),
            Attempt::Unauthorized => {
                error!(msisdn, "lookup API still answered 401 after credential refresh");
                Err(CoreError::Unauthorized {
                    message: format!(
                        "HTTP 401 from {} after credential refresh",
                        self.client.base_url()
                    ),
                })
            }
            Attempt::Failed(e) => {
                error!(msisdn, error = %e, "could not get network id");
                Err(e)
            }
        }
    }

    /// Turn an API answer into a network identifier, checking it against
    /// the directory.
    async fn accept(&self, msisdn: &str, response: LookupResponse) -> Result<String, CoreError> {
        if !response.is_ok() {
            error!(msisdn, status = %response.status, body = %response.raw, "lookup API failed");
            return Err(CoreError::InvalidResponse {
                status: response.status,
                body: response.raw,
            });
        }

        let Some(network_id) = response.network_id else {
            return Err(CoreError::Transport {
                message: "status ok but no network id in response".into(),
                status: None,
            });
        };

        if self.directory.validate(&network_id).await? {
            debug!(msisdn, network_id = %network_id, "network id validated");
            return Ok(network_id);
        }

        error!(
            msisdn,
            network_id = %network_id,
            vlr_address = response.vlr_address.as_deref().unwrap_or("<none>"),
            "no valid network id found in directory"
        );

        match self.policy {
            DirectoryPolicy::Permissive => Ok(network_id),
            DirectoryPolicy::Strict => Err(CoreError::UnknownNetwork {
                msisdn: msisdn.to_owned(),
                network_id,
            }),
        }
    }
}

impl<C: CredentialStore, D: NetworkDirectorySource> NetworkIdLookup
    for RemoteIdentityResolver<C, D>
{
    async fn lookup(&self, msisdn: &str) -> Result<String, CoreError> {
        let response = self.fetch(msisdn).await?;
        self.accept(msisdn, response).await
    }
}
