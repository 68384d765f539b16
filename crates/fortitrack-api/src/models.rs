// FortiOS response models
//
// Every monitor endpoint wraps its payload as
// `{ "results": ..., "status": "success", "serial": ..., "version": ... }`.
// Device records are kept as raw JSON because their field set varies
// with firmware release and enabled features.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Oldest FortiOS release exposing `monitor/user/device/query`.
pub const MINIMUM_SUPPORTED_VERSION: FirmwareVersion = FirmwareVersion::new(6, 4, 3);

/// The standard FortiOS monitor envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub results: T,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub vdom: Option<String>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub build: Option<u64>,
}

/// `results` object of `monitor/system/status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResults {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Firewall identity and firmware, flattened from the status envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub serial: String,
    pub version: String,
    pub build: Option<u64>,
    pub hostname: Option<String>,
    pub model: Option<String>,
}

impl SystemStatus {
    /// Parse the reported firmware version.
    pub fn firmware(&self) -> Result<FirmwareVersion, Error> {
        self.version.parse()
    }

    /// Fail with [`Error::UnsupportedVersion`] if the firmware is older
    /// than [`MINIMUM_SUPPORTED_VERSION`].
    pub fn check_supported(&self) -> Result<FirmwareVersion, Error> {
        let found = self.firmware()?;
        if found < MINIMUM_SUPPORTED_VERSION {
            return Err(Error::UnsupportedVersion {
                found: self.version.clone(),
                minimum: MINIMUM_SUPPORTED_VERSION.to_string(),
            });
        }
        Ok(found)
    }
}

// ── FirmwareVersion ─────────────────────────────────────────────────

/// FortiOS release number, e.g. `v7.2.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FirmwareVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FirmwareVersion {
    type Err = Error;

    /// Accepts `v7.2.5`, `7.2.5`, and `7.2` (missing parts are zero).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVersion(s.to_owned());
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut parts = bare.split('.');
        let mut next = |required: bool| -> Result<u32, Error> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(true)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self::new(major, minor, patch))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(version: &str) -> SystemStatus {
        SystemStatus {
            serial: "FGT60FTK20000000".into(),
            version: version.into(),
            build: Some(1517),
            hostname: None,
            model: None,
        }
    }

    #[test]
    fn parses_prefixed_version() {
        let v: FirmwareVersion = "v7.2.5".parse().unwrap();
        assert_eq!(v, FirmwareVersion::new(7, 2, 5));
        assert_eq!(v.to_string(), "7.2.5");
    }

    #[test]
    fn parses_two_part_version() {
        let v: FirmwareVersion = "7.0".parse().unwrap();
        assert_eq!(v, FirmwareVersion::new(7, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!("seven".parse::<FirmwareVersion>().is_err());
        assert!("7".parse::<FirmwareVersion>().is_err());
        assert!("7.2.5.1".parse::<FirmwareVersion>().is_err());
    }

    #[test]
    fn versions_order_numerically() {
        let a: FirmwareVersion = "6.4.10".parse().unwrap();
        let b: FirmwareVersion = "6.4.3".parse().unwrap();
        assert!(a > b);
    }

    #[test]
    fn minimum_version_is_supported() {
        assert!(status("v6.4.3").check_supported().is_ok());
        assert!(status("v7.4.1").check_supported().is_ok());
    }

    #[test]
    fn older_version_is_rejected() {
        let err = status("v6.2.9").check_supported().unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { .. }));
    }
}
