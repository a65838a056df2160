//! Command handlers, plus the config loading they share.

pub mod config_cmd;
pub mod networks;
pub mod resolve;

use std::path::PathBuf;

use netid_config::Config;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` or the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(netid_config::config_path)
}

/// Load the config file + environment, then apply CLI flag overrides.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = netid_config::load_config_from(&config_file(global))?;

    if let Some(ref url) = global.api_url {
        cfg.api.url = Some(url.clone());
    }
    if global.insecure {
        cfg.api.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.api.timeout = timeout;
    }
    Ok(cfg)
}
