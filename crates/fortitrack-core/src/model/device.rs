// ── Device domain types ──

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

/// Scalar attribute value copied verbatim from a source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl AttrValue {
    /// Convert a JSON scalar. Objects, arrays, and null are not attributes.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One network client as last reported by the firewall.
///
/// Only `id` and `is_online` carry meaning for reconciliation; everything
/// else is informational and copied as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: MacAddress,
    pub is_online: bool,
    pub last_seen: Option<DateTime<Utc>>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Device {
    pub fn new(id: MacAddress, is_online: bool) -> Self {
        Self {
            id,
            is_online,
            last_seen: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion, mostly for tests and adapters.
    pub fn with_attribute(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.attribute(key)
            .and_then(AttrValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn hostname(&self) -> Option<&str> {
        self.text("hostname")
    }

    pub fn ipv4(&self) -> Option<&str> {
        self.text("ipv4_address")
    }

    pub fn hardware_vendor(&self) -> Option<&str> {
        self.text("hardware_vendor")
    }

    pub fn os_name(&self) -> Option<&str> {
        self.text("os_name")
    }

    /// Hostname when reported, otherwise the MAC address.
    pub fn display_name(&self) -> String {
        self.hostname()
            .map_or_else(|| self.id.to_string(), str::to_owned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mac() -> MacAddress {
        MacAddress::parse("aa:bb:cc:dd:ee:ff").unwrap()
    }

    #[test]
    fn scalars_convert() {
        assert_eq!(AttrValue::from_json(&json!(true)), Some(AttrValue::Bool(true)));
        assert_eq!(AttrValue::from_json(&json!(42)), Some(AttrValue::Int(42)));
        assert_eq!(AttrValue::from_json(&json!(1.5)), Some(AttrValue::Float(1.5)));
        assert_eq!(
            AttrValue::from_json(&json!("x")),
            Some(AttrValue::Text("x".into()))
        );
    }

    #[test]
    fn non_scalars_are_dropped() {
        assert_eq!(AttrValue::from_json(&json!(null)), None);
        assert_eq!(AttrValue::from_json(&json!([1, 2])), None);
        assert_eq!(AttrValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn display_name_prefers_trimmed_hostname() {
        let dev = Device::new(mac(), true)
            .with_attribute("hostname", AttrValue::Text("  nas  ".into()));
        assert_eq!(dev.display_name(), "nas");
    }

    #[test]
    fn display_name_falls_back_to_mac() {
        let dev = Device::new(mac(), false)
            .with_attribute("hostname", AttrValue::Text("   ".into()));
        assert_eq!(dev.display_name(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn serializes_attributes_untagged() {
        let dev = Device::new(mac(), true)
            .with_attribute("ipv4_address", AttrValue::Text("10.0.0.2".into()));
        let v = serde_json::to_value(&dev).unwrap();
        assert_eq!(v["id"], "AA:BB:CC:DD:EE:FF");
        assert_eq!(v["attributes"]["ipv4_address"], "10.0.0.2");
    }
}
