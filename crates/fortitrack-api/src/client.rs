// FortiOS REST client
//
// Wraps `reqwest::Client` with FortiOS URL construction, bearer-token
// injection, `vdom` scoping, and envelope unwrapping. Endpoint methods
// live next to the transport mechanics because the surface is small.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ApiResponse, StatusResults, SystemStatus};
use crate::transport::TransportConfig;

/// Device inventory endpoint (FortiOS 6.4.3+).
pub const DEVICE_QUERY_PATH: &str = "monitor/user/device/query";

/// Firmware and identity endpoint.
pub const SYSTEM_STATUS_PATH: &str = "monitor/system/status";

/// Raw HTTP client for a single FortiGate.
///
/// Every request carries `Authorization: Bearer <token>` and a `vdom`
/// query parameter. All methods return the unwrapped `results` payload;
/// the envelope is stripped before the caller sees it.
#[derive(Clone)]
pub struct FortiOsClient {
    http: reqwest::Client,
    base_url: Url,
    vdom: String,
}

impl FortiOsClient {
    /// Create a client for the firewall at `base_url`
    /// (e.g. `https://192.168.1.1:443`).
    pub fn new(
        base_url: Url,
        token: &SecretString,
        vdom: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self::with_client(http, base_url, vdom))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for any authorization headers.
    pub fn with_client(http: reqwest::Client, base_url: Url, vdom: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            vdom: vdom.into(),
        }
    }

    /// The firewall base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The virtual domain every request is scoped to.
    pub fn vdom(&self) -> &str {
        &self.vdom
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/v2/{path}?vdom={vdom}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/api/v2/{path}"))?;
        url.query_pairs_mut().append_pair("vdom", &self.vdom);
        Ok(url)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Query every device the firewall currently knows about.
    ///
    /// `GET /api/v2/monitor/user/device/query`
    ///
    /// Records are returned as raw JSON; field interpretation belongs to
    /// the caller.
    pub async fn query_devices(&self) -> Result<Vec<serde_json::Value>, Error> {
        debug!("querying device inventory");
        let envelope: ApiResponse<Vec<serde_json::Value>> = self.get(DEVICE_QUERY_PATH).await?;
        Ok(envelope.results)
    }

    /// Fetch firmware version and serial number.
    ///
    /// `GET /api/v2/monitor/system/status`
    pub async fn system_status(&self) -> Result<SystemStatus, Error> {
        debug!("fetching system status");
        let envelope: ApiResponse<StatusResults> = self.get(SYSTEM_STATUS_PATH).await?;
        let ApiResponse {
            results,
            serial,
            version,
            build,
            ..
        } = envelope;

        let missing = |field: &str| Error::Deserialization {
            message: format!("system status is missing `{field}`"),
            body: String::new(),
        };

        Ok(SystemStatus {
            serial: serial.ok_or_else(|| missing("serial"))?,
            version: version.ok_or_else(|| missing("version"))?,
            build,
            hostname: results.hostname,
            model: results.model.or(results.model_name),
        })
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, Error> {
        let url = self.api_url(path)?;
        debug!(path, vdom = %self.vdom, "GET");

        let resp = self.http.get(url).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Map HTTP status to errors, then decode `{ results, status, ... }`.
    ///
    /// FortiOS occasionally reports failures as HTTP 200 with
    /// `"status": "error"`; those are surfaced as [`Error::Api`].
    async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<ApiResponse<T>, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "API token rejected (HTTP 401)".into(),
            });
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Forbidden {
                message: "token lacks permission for this endpoint (HTTP 403)".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        if envelope.status.as_deref() == Some("error") {
            return Err(Error::Api {
                status: envelope.http_status.unwrap_or(status.as_u16()),
                message: "request reported status \"error\"".into(),
            });
        }

        Ok(envelope)
    }
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
