// netid-api: HTTP+XML client for the subscriber network-identity lookup API

pub mod auth;
pub mod error;
pub mod lookup;
pub mod transport;

pub use auth::ApiCredential;
pub use error::Error;
pub use lookup::{LookupClient, LookupResponse, STATUS_OK};
pub use transport::{DEFAULT_USER_AGENT, TlsMode, TransportConfig};
