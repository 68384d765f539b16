// ── Raw record → Device conversion ──
//
// Source records are loosely-typed JSON objects. Only the id and the
// online flag are required; every other scalar field is copied into the
// device's attribute map unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::RecordSchema;
use crate::error::DecodeError;
use crate::model::{AttrValue, Device, MacAddress};

/// Decode one raw record. `index` is only used for error reporting.
pub fn decode_device(
    index: usize,
    record: &Value,
    schema: &RecordSchema,
) -> Result<Device, DecodeError> {
    let Some(fields) = record.as_object() else {
        return Err(DecodeError::NotAnObject { index });
    };

    let raw_id = fields
        .get(&schema.id_field)
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::MissingId {
            index,
            field: schema.id_field.clone(),
        })?;

    let id = MacAddress::parse(raw_id).map_err(|_| DecodeError::InvalidId {
        index,
        value: raw_id.to_owned(),
    })?;

    let is_online = fields
        .get(&schema.online_field)
        .and_then(Value::as_bool)
        .ok_or_else(|| DecodeError::MissingOnlineFlag {
            id: id.clone(),
            field: schema.online_field.clone(),
        })?;

    let last_seen = fields
        .get(&schema.last_seen_field)
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

    let attributes: BTreeMap<String, AttrValue> = fields
        .iter()
        .filter_map(|(k, v)| AttrValue::from_json(v).map(|a| (k.clone(), a)))
        .collect();

    Ok(Device {
        id,
        is_online,
        last_seen,
        attributes,
    })
}
