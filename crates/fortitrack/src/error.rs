//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use fortitrack_config::ConfigError;
use fortitrack_core::{CoreError, FetchError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to firewall at {url}")]
    #[diagnostic(
        code(fortitrack::connection_failed),
        help(
            "Check that the firewall is reachable and the HTTPS admin port is correct.\n\
             {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fortitrack::auth_failed),
        help(
            "Verify the REST API administrator token and its trusted hosts.\n\
             The token needs read access to monitor/user/device."
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(fortitrack::no_credentials),
        help(
            "Pass --token, set FORTITRACK_TOKEN, or run: fortitrack config set-token --profile {profile}"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fortitrack::not_found),
        help("Run: fortitrack {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Firmware ─────────────────────────────────────────────────────
    #[error("Firmware {found} is not supported")]
    #[diagnostic(
        code(fortitrack::unsupported_firmware),
        help("FortiOS {minimum} or later is required for the device inventory endpoint.")
    )]
    UnsupportedFirmware { found: String, minimum: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(fortitrack::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fortitrack::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fortitrack::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fortitrack config init --firewall <host>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No firewall configured")]
    #[diagnostic(
        code(fortitrack::no_config),
        help(
            "Create a profile with: fortitrack config init --firewall <host>\n\
             Or pass --host and --token.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fortitrack::config))]
    Config(Box<ConfigError>),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(fortitrack::timeout),
        help("Increase timeout with --timeout or check firewall responsiveness.")
    )]
    Timeout,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(fortitrack::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a failed device fetch, filling in connection context.
    pub fn from_fetch(err: FetchError, url: &str) -> Self {
        match err {
            FetchError::Timeout => Self::Timeout,
            FetchError::Unauthorized { message } => Self::AuthFailed { message },
            FetchError::Unreachable { message } => Self::ConnectionFailed {
                url: url.into(),
                reason: message,
            },
            FetchError::Malformed { message } | FetchError::Other { message } => {
                Self::ApiError { message }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout => Self::Timeout,
            CoreError::DeviceNotFound { identifier } => Self::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },
            CoreError::UnsupportedFirmware { found, minimum } => {
                Self::UnsupportedFirmware { found, minimum }
            }
            CoreError::Api { message, status } => Self::ApiError {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Refresh(e) => Self::ApiError {
                message: e.to_string(),
            },
        }
    }
}

impl From<fortitrack_api::Error> for CliError {
    fn from(err: fortitrack_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
