//! `netid networks`: list the known-network directory.

use tabled::Tabled;

use netid_core::{NetworkDirectory, NetworkEntry};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Country")]
    country: String,
}

fn network_row(n: &NetworkEntry) -> NetworkRow {
    NetworkRow {
        id: n.id.clone(),
        name: n.name.clone(),
        country: n.country.clone(),
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = super::load_config(global)?;
    let directory = NetworkDirectory::load(cfg.directory_source()?).await?;

    let snapshot = directory.snapshot();
    let networks: Vec<NetworkEntry> = snapshot.entries().into_iter().cloned().collect();
    tracing::debug!(count = networks.len(), "listing networks");

    let out = output::render_list(&global.output, &networks, network_row, |n| n.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
