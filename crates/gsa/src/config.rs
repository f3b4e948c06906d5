//! Flag overrides on top of `gsa_config` profiles.
//!
//! This is the single boundary where CLI options cross into
//! `gsa_core::ConnectionConfig`.

use clap::ValueEnum;
use gsa_api::Endpoint;
use gsa_config::{Config, Profile};
use gsa_core::ConnectionConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::commands::util;
use crate::error::CliError;

/// Output format: flag, then `defaults.output`, then table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// The active profile with every CLI flag applied. Falls back to an empty
/// profile when none is configured and `--profile` was not given.
pub fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = cfg.active_profile_name(global.profile.as_deref());
    let mut profile = match cfg.profile(&name) {
        Ok(profile) => profile.clone(),
        Err(err) if global.profile.is_some() => return Err(err.into()),
        Err(_) => Profile::default(),
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = Some(port);
    }
    if let Some(protocol) = global.protocol {
        profile.protocol = Some(protocol.as_str().to_owned());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok((name, profile))
}

/// Build the `ConnectionConfig` for the single appliance a command targets.
pub fn connection_config(global: &GlobalOpts, cfg: &Config) -> Result<ConnectionConfig, CliError> {
    let (name, profile) = resolve_profile(global, cfg)?;
    if profile.host.trim().is_empty() {
        return Err(CliError::NoConfig {
            path: gsa_config::config_path().display().to_string(),
        });
    }
    finish(global, cfg, &name, &profile)
}

/// Credentials and tuning from the active profile, aimed at each of
/// `endpoints` in turn. The password is resolved once.
pub fn connection_configs_for(
    global: &GlobalOpts,
    cfg: &Config,
    endpoints: &[Endpoint],
) -> Result<Vec<ConnectionConfig>, CliError> {
    let Some(first) = endpoints.first() else {
        return Ok(Vec::new());
    };
    let (name, mut profile) = resolve_profile(global, cfg)?;
    profile.host.clone_from(&first.host);
    profile.port = Some(first.port);
    profile.protocol = Some(first.protocol.clone());

    let base = finish(global, cfg, &name, &profile)?;
    Ok(endpoints
        .iter()
        .map(|endpoint| base.for_endpoint(endpoint.clone()))
        .collect())
}

/// Parse `host`, `host:port` or `protocol://host:port` for every entry.
pub fn parse_endpoints(hosts: &[String]) -> Result<Vec<Endpoint>, CliError> {
    Ok(hosts
        .iter()
        .map(|host| host.parse::<Endpoint>())
        .collect::<Result<Vec<_>, _>>()?)
}

/// Targets of a fleet command: explicit hosts, then `[monitor].hosts`,
/// then the active profile's appliance.
pub fn fleet_connections(
    global: &GlobalOpts,
    cfg: &Config,
    hosts: &[String],
) -> Result<Vec<ConnectionConfig>, CliError> {
    let hosts = if hosts.is_empty() {
        cfg.monitor.hosts.as_slice()
    } else {
        hosts
    };
    if hosts.is_empty() {
        return Ok(vec![connection_config(global, cfg)?]);
    }
    connection_configs_for(global, cfg, &parse_endpoints(hosts)?)
}

fn finish(
    global: &GlobalOpts,
    cfg: &Config,
    name: &str,
    profile: &Profile,
) -> Result<ConnectionConfig, CliError> {
    let config = if global.password_stdin {
        let password = util::read_password_stdin()?;
        gsa_config::connection_config_with_password(profile, name, &cfg.defaults, password)?
    } else {
        gsa_config::profile_to_connection_config(profile, name, &cfg.defaults)?
    };
    Ok(config)
}
