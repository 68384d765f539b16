// ── Device sources ──
//
// A `DataSource` returns the complete device list an external system
// currently reports. `FortiOsSource` is the production adapter; it also
// owns the presence policy so the reconciler never does time arithmetic.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use fortitrack_api::{FortiOsClient, TlsMode, TransportConfig};

use crate::config::{FirewallConfig, OnlinePolicy, RecordSchema, TlsVerification};
use crate::error::{CoreError, FetchError};

/// One loosely-typed device record as reported by a source.
pub type RawRecord = Value;

/// Provider of the current device list.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetch every device the source currently reports.
    ///
    /// Pagination, if any, is assembled here; callers always get one list.
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError>;
}

// ── FortiOS adapter ─────────────────────────────────────────────────

/// Polls `monitor/user/device/query` on a FortiGate.
pub struct FortiOsSource {
    client: FortiOsClient,
    online: OnlinePolicy,
    schema: RecordSchema,
}

impl FortiOsSource {
    pub fn new(client: FortiOsClient, online: OnlinePolicy, schema: RecordSchema) -> Self {
        Self {
            client,
            online,
            schema,
        }
    }

    /// Build the HTTP client and adapter from runtime configuration.
    pub fn from_config(config: &FirewallConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let client =
            FortiOsClient::new(config.url.clone(), &config.token, &config.vdom, &transport)?;
        Ok(Self::new(
            client,
            config.online,
            config.reconciler.schema.clone(),
        ))
    }

    pub fn client(&self) -> &FortiOsClient {
        &self.client
    }
}

#[async_trait]
impl DataSource for FortiOsSource {
    async fn fetch(&self) -> Result<Vec<RawRecord>, FetchError> {
        let mut records = self.client.query_devices().await?;
        debug!(count = records.len(), "fetched device records");

        if let OnlinePolicy::SeenWithin(window) = self.online {
            apply_seen_within(&mut records, &self.schema, window, Utc::now());
        }
        Ok(records)
    }
}

/// Overwrite each record's online flag with `now - last_seen <= window`.
///
/// Records without an integer `last_seen` are marked offline. Non-object
/// records are left alone for the decoder to reject.
pub fn apply_seen_within(
    records: &mut [RawRecord],
    schema: &RecordSchema,
    window: Duration,
    now: DateTime<Utc>,
) {
    let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
    let now_secs = now.timestamp();

    for record in records.iter_mut() {
        let Some(fields) = record.as_object_mut() else {
            continue;
        };
        let online = fields
            .get(&schema.last_seen_field)
            .and_then(Value::as_i64)
            .is_some_and(|seen| now_secs.saturating_sub(seen) <= window_secs);
        fields.insert(schema.online_field.clone(), Value::Bool(online));
    }
}
