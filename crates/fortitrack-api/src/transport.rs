// Shared transport configuration for building reqwest::Client instances.
//
// Keeps TLS, timeout, and default-header settings in one place so the
// client constructor does not duplicate builder logic.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

/// Per-request timeout used by the FortiOS integration.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (FortiGates ship self-signed certificates).
    #[default]
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    ///
    /// The FortiOS client uses this to inject the bearer token.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("fortitrack/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if self.tls == TlsMode::DangerAcceptInvalid {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
