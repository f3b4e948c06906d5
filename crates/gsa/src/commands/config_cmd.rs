//! Config subcommand handlers.

use secrecy::ExposeSecret;

use gsa_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

const REDACTED: &str = "********";

pub fn handle(
    args: ConfigArgs,
    global: &GlobalOpts,
    mut cfg: Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", gsa_config::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some(REDACTED.into());
                }
            }
            let toml = gsa_config::render_config(&cfg)?;
            let out = output::render_single(format, &cfg, |_| toml.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let name = cfg.active_profile_name(global.profile.as_deref());
            let password = if global.password_stdin {
                util::read_password_stdin()?
            } else {
                util::prompt_password(&format!("Password for profile '{name}': "))?
            };
            gsa_config::store_password(&name, password.expose_secret())?;
            if !global.quiet {
                eprintln!("Password for profile '{name}' stored in the system keyring");
            }
            Ok(())
        }
    }
}
