//! `netid resolve`: look up MSISDNs through one shared provider.

use serde::Serialize;
use tabled::Tabled;

use netid_core::{CoreError, NetworkIdProvider};

use crate::cli::{GlobalOpts, ResolveArgs};
use crate::error::CliError;
use crate::output;

/// One line of output per requested MSISDN.
#[derive(Debug, Serialize)]
struct Resolution {
    msisdn: String,
    network_id: Option<String>,
    network: Option<String>,
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct ResolutionRow {
    #[tabled(rename = "MSISDN")]
    msisdn: String,
    #[tabled(rename = "Network ID")]
    network_id: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn resolution_row(r: &Resolution, color: bool) -> ResolutionRow {
    let dash = || "-".to_owned();
    ResolutionRow {
        msisdn: r.msisdn.clone(),
        network_id: r.network_id.clone().unwrap_or_else(dash),
        network: r.network.clone().unwrap_or_else(dash),
        country: r.country.clone().unwrap_or_else(dash),
        status: match r.error {
            Some(ref e) => output::paint_status(e, false, color),
            None => output::paint_status("ok", true, color),
        },
    }
}

fn plain_line(r: &Resolution) -> String {
    format!("{}\t{}", r.msisdn, r.network_id.as_deref().unwrap_or("-"))
}

pub async fn handle(args: ResolveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = super::load_config(global)?;
    let resolver_config = cfg.resolver_config()?;
    let provider = NetworkIdProvider::connect(
        &resolver_config,
        cfg.credential_store(),
        cfg.directory_source()?,
    )
    .await?;

    let outcomes =
        futures::future::join_all(args.msisdns.iter().map(|m| provider.get_network_id(m))).await;

    let mut resolutions = Vec::with_capacity(outcomes.len());
    let mut failures: Vec<(String, CoreError)> = Vec::new();
    for (msisdn, outcome) in args.msisdns.iter().zip(outcomes) {
        match outcome {
            Ok(network_id) => {
                let entry = provider.network(&network_id);
                resolutions.push(Resolution {
                    msisdn: msisdn.clone(),
                    network: entry.as_ref().map(|n| n.name.clone()),
                    country: entry.map(|n| n.country),
                    network_id: Some(network_id),
                    error: None,
                });
            }
            Err(e) => {
                resolutions.push(Resolution {
                    msisdn: msisdn.clone(),
                    network_id: None,
                    network: None,
                    country: None,
                    error: Some(e.to_string()),
                });
                failures.push((msisdn.clone(), e));
            }
        }
    }

    let total = resolutions.len();
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &resolutions,
        |r| resolution_row(r, color),
        plain_line,
    )?;
    output::print_output(&out, global.quiet);

    match failures.len() {
        0 => Ok(()),
        1 if total == 1 => {
            let (msisdn, err) = failures.remove(0);
            Err(CliError::from_lookup(&msisdn, err))
        }
        failed => Err(CliError::PartialFailure { failed, total }),
    }
}
