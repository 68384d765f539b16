//! Clap derive structures for the `fortitrack` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fortitrack -- see which devices are on a FortiGate network
#[derive(Debug, Parser)]
#[command(
    name = "fortitrack",
    version,
    about = "Track device presence on FortiGate networks",
    long_about = "Polls the FortiOS device inventory (monitor/user/device/query)\n\
        and keeps a registry of every device ever seen, reporting new\n\
        devices and presence changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "FORTITRACK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Firewall profile to use
    #[arg(long, short = 'p', env = "FORTITRACK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Firewall hostname or IP (overrides profile)
    #[arg(long, short = 'H', env = "FORTITRACK_HOST", global = true)]
    pub host: Option<String>,

    /// HTTPS port (overrides profile)
    #[arg(long, env = "FORTITRACK_PORT", global = true)]
    pub port: Option<u16>,

    /// REST API token
    #[arg(long, env = "FORTITRACK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Virtual domain (overrides profile)
    #[arg(long, env = "FORTITRACK_VDOM", global = true)]
    pub vdom: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FORTITRACK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FORTITRACK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FORTITRACK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Diagnostic log format on stderr
    #[arg(
        long,
        env = "FORTITRACK_LOG_FORMAT",
        default_value = "text",
        global = true
    )]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line (log collectors)
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query the devices the firewall knows about
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Poll continuously and print registry events
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Show firmware version and check it is supported
    Status,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List every device
    #[command(alias = "ls")]
    List {
        /// Only show devices that are online
        #[arg(long)]
        online: bool,
    },

    /// Show one device by MAC address
    Get {
        /// MAC address in any common notation
        mac: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period in seconds (overrides profile scan_interval)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the configuration with secrets masked
    Show,

    /// Create or replace a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Firewall hostname or IP
        #[arg(long = "firewall")]
        firewall: String,

        /// Environment variable holding the API token
        #[arg(long)]
        token_env: Option<String>,

        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,

        /// Contact the firewall, check its firmware, and record its serial
        #[arg(long)]
        verify: bool,
    },

    /// Store the API token for a profile in the system keyring
    SetToken {
        /// The token (reads --token / FORTITRACK_TOKEN when omitted)
        token: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
