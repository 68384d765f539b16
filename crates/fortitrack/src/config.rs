//! CLI configuration: thin wrapper around `fortitrack_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --token, --vdom, ...).

use std::path::PathBuf;

use secrecy::SecretString;

use fortitrack_core::FirewallConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use fortitrack_config::{Config, Profile, save_config_to};

/// Config file in effect: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fortitrack_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(fortitrack_config::load_config_from(&config_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the runtime `FirewallConfig`.
///
/// Precedence: CLI flag / env > profile > built-in default. With no
/// matching profile, `--host` and `--token` alone are enough.
pub fn resolve_firewall_config(global: &GlobalOpts) -> Result<FirewallConfig, CliError> {
    let cfg = load(global)?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profiles.get(&name), &global.host) {
        (Some(p), _) => p.clone(),
        (None, Some(host)) if global.profile.is_none() => Profile::new(host.clone()),
        (None, _) if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, _) => {
            return Err(CliError::NoConfig {
                path: config_path(global).display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);

    let token = match global.token {
        Some(ref token) => SecretString::from(token.clone()),
        None => fortitrack_config::resolve_token(&profile, &name)?,
    };

    Ok(fortitrack_config::profile_to_firewall_config(
        &profile, token,
    )?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(port) = global.port {
        profile.port = port;
    }
    if let Some(ref vdom) = global.vdom {
        profile.vdom.clone_from(vdom);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = timeout;
    }
    if global.insecure {
        profile.verify_ssl = false;
    }
}
