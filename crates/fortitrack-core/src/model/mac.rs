// ── Device identity ──
//
// The link-layer address is the only stable key a firewall reports for
// a client, so every registry lookup goes through this type.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidMac;

/// MAC address, normalized to upper-case colon-separated form
/// (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize a MAC address.
    ///
    /// Accepts colon-, dash-, or dot-separated groups and bare hex.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, InvalidMac> {
        let raw = raw.as_ref();
        let hex: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | '.'))
            .collect();

        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidMac(raw.to_owned()));
        }

        let upper = hex.to_ascii_uppercase();
        let mut out = String::with_capacity(17);
        for (i, pair) in upper.as_bytes().chunks(2).enumerate() {
            if i > 0 {
                out.push(':');
            }
            out.extend(pair.iter().map(|&b| char::from(b)));
        }
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMac;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for MacAddress {
    type Error = InvalidMac;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
