use thiserror::Error;

/// Top-level error type for the `fortitrack-api` crate.
///
/// Covers every failure mode of the FortiOS REST surface: token
/// rejection, transport, HTTP status errors, and payload decoding.
/// `fortitrack-core` maps these into fetch failures and diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API token was rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The token is valid but lacks the required access profile (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The token contains bytes that cannot be sent in an HTTP header.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status other than 401/403.
    #[error("FortiOS API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Firmware ────────────────────────────────────────────────────
    /// A firmware version string could not be parsed.
    #[error("Invalid firmware version: {0:?}")]
    InvalidVersion(String),

    /// The firewall runs a FortiOS release older than the supported minimum.
    #[error("Unsupported FortiOS version {found}; at least {minimum} is required")]
    UnsupportedVersion { found: String, minimum: String },
}

impl Error {
    /// Returns `true` if the token was rejected or lacks permissions.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Forbidden { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
