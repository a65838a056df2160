// Network-identity lookup API
//
// One GET per subscriber identifier against a base endpoint, authenticated
// with HTTP Basic auth, answered with a small XML document.

mod client;
mod models;

pub use client::LookupClient;
pub use models::{LookupResponse, STATUS_OK};
