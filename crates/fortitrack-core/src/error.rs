// ── Core error types ──
//
// Refresh failures never cross the reconciler boundary as `Err`; they are
// carried inside `RefreshOutcome`. `CoreError` covers everything else
// (building a source, firmware checks). The `From<fortitrack_api::Error>`
// impls translate transport-layer errors into these domain variants.

use thiserror::Error;

use crate::model::MacAddress;

/// A string that is not a 12-digit hexadecimal MAC address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address: {0:?}")]
pub struct InvalidMac(pub String);

/// Why a [`DataSource`](crate::DataSource) could not produce a device list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("authentication rejected: {message}")]
    Unauthorized { message: String },

    #[error("source unreachable: {message}")]
    Unreachable { message: String },

    #[error("malformed payload: {message}")]
    Malformed { message: String },

    #[error("source error: {message}")]
    Other { message: String },
}

impl FetchError {
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

impl From<fortitrack_api::Error> for FetchError {
    fn from(err: fortitrack_api::Error) -> Self {
        use fortitrack_api::Error as Api;

        if err.is_timeout() {
            return Self::Timeout;
        }
        match err {
            Api::Authentication { message } | Api::Forbidden { message } => {
                Self::Unauthorized { message }
            }
            Api::Transport(ref e) if e.is_connect() => Self::Unreachable {
                message: e.to_string(),
            },
            Api::Deserialization { message, body: _ } => Self::Malformed { message },
            other => Self::Other {
                message: other.to_string(),
            },
        }
    }
}

/// A single source record that could not be turned into a [`Device`](crate::Device).
///
/// `index` is the record's position in the fetched list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("record {index} has no `{field}` field")]
    MissingId { index: usize, field: String },

    #[error("record {index} has an invalid id {value:?}")]
    InvalidId { index: usize, value: String },

    #[error("device {id} has no boolean `{field}` field")]
    MissingOnlineFlag { id: MacAddress, field: String },
}

impl DecodeError {
    /// Id of the device the record describes, when it could be read.
    pub fn id(&self) -> Option<&MacAddress> {
        match self {
            Self::MissingOnlineFlag { id, .. } => Some(id),
            Self::NotAnObject { .. } | Self::MissingId { .. } | Self::InvalidId { .. } => None,
        }
    }
}

/// Why a refresh cycle produced no registry update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("refresh cancelled by shutdown")]
    Cancelled,
}

/// Unified error type for non-refresh operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot connect to firewall at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Firewall request timed out")]
    Timeout,

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Unsupported firmware {found}; at least {minimum} is required")]
    UnsupportedFirmware { found: String, minimum: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

impl From<fortitrack_api::Error> for CoreError {
    fn from(err: fortitrack_api::Error) -> Self {
        use fortitrack_api::Error as Api;

        match err {
            Api::Authentication { message } | Api::Forbidden { message } => {
                Self::AuthenticationFailed { message }
            }
            Api::Transport(ref e) if e.is_timeout() => Self::Timeout,
            Api::Transport(ref e) if e.is_connect() => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Api::Transport(e) => Self::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::InvalidToken(reason) => Self::Config {
                message: format!("Invalid API token: {reason}"),
            },
            Api::Tls(msg) => Self::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            Api::Api { status, message } => Self::Api {
                message,
                status: Some(status),
            },
            Api::Deserialization { message, body: _ } => Self::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
            Api::InvalidVersion(v) => Self::Api {
                message: format!("Invalid firmware version: {v:?}"),
                status: None,
            },
            Api::UnsupportedVersion { found, minimum } => {
                Self::UnsupportedFirmware { found, minimum }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_auth_maps_to_unauthorized_fetch() {
        let err = FetchError::from(fortitrack_api::Error::Authentication {
            message: "bad token".into(),
        });
        assert!(err.is_auth());
    }

    #[test]
    fn api_deserialization_maps_to_malformed() {
        let err = FetchError::from(fortitrack_api::Error::Deserialization {
            message: "expected value".into(),
            body: "<html>".into(),
        });
        assert_eq!(
            err,
            FetchError::Malformed {
                message: "expected value".into()
            }
        );
    }

    #[test]
    fn unsupported_version_maps_to_core() {
        let err = CoreError::from(fortitrack_api::Error::UnsupportedVersion {
            found: "v6.2.0".into(),
            minimum: "6.4.3".into(),
        });
        assert!(matches!(err, CoreError::UnsupportedFirmware { .. }));
    }
}
