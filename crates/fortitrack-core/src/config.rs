// ── Runtime configuration ──
//
// These types describe *how* to reach a firewall and how to reconcile
// what it reports. They carry credential data and tuning but never touch
// disk: the CLI builds a `FirewallConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

/// Field names used to pull the load-bearing values out of a raw record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Hardware address field (`master_mac` on FortiOS 6.4+).
    pub id_field: String,
    /// Boolean presence flag.
    pub online_field: String,
    /// Epoch-seconds timestamp of the last observation.
    pub last_seen_field: String,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            id_field: "master_mac".into(),
            online_field: "is_online".into(),
            last_seen_field: "last_seen".into(),
        }
    }
}

/// What happens to registry entries the source stops reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RemovalPolicy {
    /// Keep every id ever seen; a vanished device keeps its last state.
    #[default]
    Retain,
    /// Drop ids that are absent from a successful fetch.
    Prune,
}

/// Reconciler tuning, injected at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilerConfig {
    pub schema: RecordSchema,
    pub removal: RemovalPolicy,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Skip verification. FortiGates ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// How device presence is decided by the FortiOS adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnlinePolicy {
    /// Trust the firewall's own `is_online` flag.
    #[default]
    SourceFlag,
    /// Online iff `last_seen` is no older than the window
    /// ("consider home").
    SeenWithin(Duration),
}

/// Default "consider home" window for [`OnlinePolicy::SeenWithin`].
pub const DEFAULT_CONSIDER_HOME: Duration = Duration::from_secs(180);

/// Default poll period.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(10);

/// Everything needed to poll one firewall.
#[derive(Debug, Clone)]
pub struct FirewallConfig {
    /// Firewall base URL, e.g. `https://192.168.1.1:443`.
    pub url: Url,
    /// REST API administrator token.
    pub token: SecretString,
    /// Virtual domain to query.
    pub vdom: String,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Poll period for the background refresh loop.
    pub scan_interval: Duration,
    pub online: OnlinePolicy,
    pub reconciler: ReconcilerConfig,
}

impl FirewallConfig {
    pub fn new(url: Url, token: SecretString) -> Self {
        Self {
            url,
            token,
            vdom: "root".into(),
            tls: TlsVerification::default(),
            timeout: fortitrack_api::transport::DEFAULT_TIMEOUT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            online: OnlinePolicy::default(),
            reconciler: ReconcilerConfig::default(),
        }
    }

    /// Namespace for dispatcher signal names (`fortios-<host>`).
    pub fn signal_namespace(&self) -> String {
        format!("fortios-{}", self.url.host_str().unwrap_or("unknown"))
    }
}
