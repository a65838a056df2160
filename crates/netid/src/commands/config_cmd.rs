//! Config subcommand handlers.

use std::io::BufRead;

use netid_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = super::config_file(global);
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        // Passwords live in the settings file or keyring, never in the
        // config itself, so nothing here needs redacting.
        ConfigCommand::Show => {
            let cfg = super::load_config(global)?;
            let out = output::render_single(&global.output, &cfg, |c| {
                toml::to_string_pretty(c).map_err(|e| CliError::Render {
                    message: e.to_string(),
                })
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            url,
            directory,
            credentials,
            force,
        } => {
            let path = super::config_file(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            if url.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "url".into(),
                    reason: "must not be empty".into(),
                });
            }

            let mut cfg = Config::default();
            cfg.api.url = Some(url);
            cfg.directory.path = directory;
            cfg.credentials.path = credentials;
            netid_config::save_config(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::SetPassword { username } => {
            let mut password = String::new();
            std::io::stdin().lock().read_line(&mut password)?;
            let password = password.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "no password on stdin".into(),
                });
            }

            netid_config::store_keyring_password(&username, password)?;
            if !global.quiet {
                eprintln!("Stored API password for {username} in the system keyring");
            }
            Ok(())
        }
    }
}
