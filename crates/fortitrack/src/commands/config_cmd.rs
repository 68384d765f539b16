//! Config subcommand handlers.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::Serialize;
use tracing::info;

use fortitrack_config::Defaults;
use fortitrack_core::FortiOsSource;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

/// Printable config: profiles sorted by name, tokens masked.
#[derive(Serialize)]
struct ConfigView {
    default_profile: Option<String>,
    defaults: Defaults,
    profiles: BTreeMap<String, Profile>,
}

impl From<&Config> for ConfigView {
    fn from(cfg: &Config) -> Self {
        Self {
            default_profile: cfg.default_profile.clone(),
            defaults: cfg.defaults.clone(),
            profiles: cfg
                .profiles
                .iter()
                .map(|(name, p)| (name.clone(), p.redacted()))
                .collect(),
        }
    }
}

fn as_toml(view: &ConfigView) -> String {
    toml::to_string_pretty(view).unwrap_or_else(|e| format!("# could not render config: {e}"))
}

/// Reach the firewall as `profile` would, gate on firmware, and return its
/// serial number.
async fn verify_firewall(
    name: &str,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<String, CliError> {
    let token = match global.token {
        Some(ref t) => SecretString::from(t.clone()),
        None => fortitrack_config::resolve_token(profile, name)?,
    };
    let firewall = fortitrack_config::profile_to_firewall_config(profile, token)?;
    let source = FortiOsSource::from_config(&firewall)?;
    let status = source.client().system_status().await?;
    let version = status.check_supported()?;
    info!(serial = %status.serial, %version, "firewall verified");
    Ok(status.serial)
}

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let view = ConfigView::from(&config::load(global)?);
            let out = output::render_single(global.output, &view, as_toml, |v| {
                v.profiles.keys().cloned().collect::<Vec<_>>().join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init {
            name,
            firewall,
            token_env,
            force,
            verify,
        } => {
            let path = config::config_path(global);
            let mut cfg = config::load(global)?;
            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: format!("profile '{name}' already exists (use --force to replace)"),
                });
            }

            let mut profile = Profile::new(firewall);
            if let Some(port) = global.port {
                profile.port = port;
            }
            if let Some(ref vdom) = global.vdom {
                profile.vdom.clone_from(vdom);
            }
            profile.token_env = token_env;
            profile.url()?;

            if verify {
                let serial = verify_firewall(&name, &profile, global).await?;
                if let Some(other) = fortitrack_config::profile_with_serial(&cfg, &serial, &name) {
                    return Err(CliError::Validation {
                        field: "firewall".into(),
                        reason: format!("already configured as profile '{other}' (serial {serial})"),
                    });
                }
                profile.serial = Some(serial);
            }

            cfg.profiles.insert(name.clone(), profile);
            if cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Profile '{name}' written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::SetToken { token } => {
            let cfg = config::load(global)?;
            let name = config::active_profile_name(global, &cfg);
            let token = token
                .or_else(|| global.token.clone())
                .ok_or_else(|| CliError::Validation {
                    field: "token".into(),
                    reason: "pass the token as an argument or via --token".into(),
                })?;
            fortitrack_config::store_token(&name, &token)?;
            if !global.quiet {
                eprintln!("Token stored in the system keyring for profile '{name}'");
            }
            Ok(())
        }
    }
}
