//! Device registry reconciliation between `fortitrack-api` and consumers.
//!
//! - **[`DeviceRegistryReconciler`]**: Owns the in-memory device registry.
//!   Each [`refresh()`](DeviceRegistryReconciler::refresh) fetches the full
//!   device list from a [`DataSource`], replaces stored devices, and emits
//!   [`RegistryEvent`]s through a [`Notifier`]. Ids are never forgotten
//!   unless [`RemovalPolicy::Prune`] is configured.
//!
//! - **[`Poller`]**: Background task driving refreshes on a fixed period
//!   with cooperative cancellation.
//!
//! - **[`FortiOsSource`]**: Production [`DataSource`] backed by the
//!   FortiOS `monitor/user/device/query` endpoint, with a pluggable
//!   [`OnlinePolicy`].
//!
//! - **Domain model** ([`model`]): [`Device`], [`MacAddress`], and
//!   [`AttrValue`].

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod notify;
pub mod poller;
pub mod reconciler;
pub mod source;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_CONSIDER_HOME, DEFAULT_SCAN_INTERVAL, FirewallConfig, OnlinePolicy, ReconcilerConfig,
    RecordSchema, RemovalPolicy, TlsVerification,
};
pub use error::{CoreError, DecodeError, FetchError, InvalidMac, RefreshError};
pub use model::{AttrValue, Device, MacAddress, RegistryEvent};
pub use notify::{BroadcastNotifier, Notifier};
pub use poller::Poller;
pub use reconciler::{DeviceRegistryReconciler, RefreshOutcome};
pub use source::{DataSource, FortiOsSource, RawRecord};
pub use store::{DeviceRegistry, RegistrySnapshot};
