//! Shared configuration for fortitrack.
//!
//! TOML profiles (one per firewall), token resolution (env + keyring +
//! plaintext), and translation to `fortitrack_core::FirewallConfig`. The
//! CLI layers its own flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fortitrack_core::{
    FirewallConfig, OnlinePolicy, ReconcilerConfig, RecordSchema, RemovalPolicy, TlsVerification,
};

/// Environment prefix for file-level overrides, e.g.
/// `FORTITRACK_PROFILES__HOME__VDOM=guest`.
pub const ENV_PREFIX: &str = "FORTITRACK_";

const KEYRING_SERVICE: &str = "fortitrack";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' is not defined")]
    UnknownProfile { name: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named firewall profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Pick a profile by name, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name.to_owned(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// How a profile decides whether a device is present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceMode {
    /// The firewall's own `is_online` flag.
    #[default]
    Flag,
    /// `last_seen` within `consider_home` seconds.
    LastSeen,
}

/// A named firewall profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP, optionally with an `https://` scheme.
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// API token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    pub token_env: Option<String>,

    #[serde(default = "default_vdom")]
    pub vdom: String,

    /// Verify the firewall's TLS certificate.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Poll period in seconds.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default)]
    pub presence: PresenceMode,

    /// Window in seconds for [`PresenceMode::LastSeen`].
    #[serde(default = "default_consider_home")]
    pub consider_home: u64,

    #[serde(default)]
    pub removal: RemovalPolicy,

    /// Override the record field used as the device id.
    pub id_field: Option<String>,

    /// Firewall serial number, recorded by `config init --verify`.
    pub serial: Option<String>,
}

impl Profile {
    /// A profile with every optional setting at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            token: None,
            token_env: None,
            vdom: default_vdom(),
            verify_ssl: false,
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
            presence: PresenceMode::default(),
            consider_home: default_consider_home(),
            removal: RemovalPolicy::default(),
            id_field: None,
            serial: None,
        }
    }

    /// Copy safe to print: a plaintext token is masked.
    pub fn redacted(&self) -> Self {
        Self {
            token: self.token.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }

    /// Base URL of the firewall's REST API.
    pub fn url(&self) -> Result<url::Url, ConfigError> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(ConfigError::Validation {
                field: "host".into(),
                reason: "must not be empty".into(),
            });
        }
        let raw = if host.contains("://") {
            host.to_owned()
        } else {
            format!("https://{host}:{}", self.port)
        };
        raw.parse().map_err(|_| ConfigError::Validation {
            field: "host".into(),
            reason: format!("invalid URL: {raw}"),
        })
    }
}

fn default_port() -> u16 {
    443
}
fn default_vdom() -> String {
    "root".into()
}
fn default_timeout() -> u64 {
    5
}
fn default_scan_interval() -> u64 {
    10
}
fn default_consider_home() -> u64 {
    180
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "fortitrack", "fortitrack").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fortitrack");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Token resolution (without CLI flags) ────────────────────────────

/// Resolve the API token: `token_env` → keyring → plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Name of another profile already bound to firewall `serial`.
pub fn profile_with_serial<'a>(cfg: &'a Config, serial: &str, except: &str) -> Option<&'a str> {
    cfg.profiles
        .iter()
        .find(|(name, p)| name.as_str() != except && p.serial.as_deref() == Some(serial))
        .map(|(name, _)| name.as_str())
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .and_then(|entry| entry.set_password(token))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Build a `FirewallConfig` from a profile and an already-resolved token.
pub fn profile_to_firewall_config(
    profile: &Profile,
    token: SecretString,
) -> Result<FirewallConfig, ConfigError> {
    let url = profile.url()?;

    if profile.scan_interval == 0 {
        return Err(ConfigError::Validation {
            field: "scan_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    if profile.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let online = match profile.presence {
        PresenceMode::Flag => OnlinePolicy::SourceFlag,
        PresenceMode::LastSeen => {
            OnlinePolicy::SeenWithin(Duration::from_secs(profile.consider_home))
        }
    };

    let mut schema = RecordSchema::default();
    if let Some(ref field) = profile.id_field {
        schema.id_field.clone_from(field);
    }

    Ok(FirewallConfig {
        url,
        token,
        vdom: profile.vdom.clone(),
        tls: if profile.verify_ssl {
            TlsVerification::SystemDefaults
        } else {
            TlsVerification::DangerAcceptInvalid
        },
        timeout: Duration::from_secs(profile.timeout),
        scan_interval: Duration::from_secs(profile.scan_interval),
        online,
        reconciler: ReconcilerConfig {
            schema,
            removal: profile.removal,
        },
    })
}
