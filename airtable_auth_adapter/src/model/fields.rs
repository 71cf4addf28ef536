//! Field-level codec between canonical values and store field values
//!
//! Timestamps travel as ISO-8601 strings and linked records as lists of ids.
//! Everything in here is the only place those representations are visible.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::store::Fields;

use super::errors::ModelError;

/// Serialize a timestamp the way the store expects it (`2024-01-01T00:00:00.000Z`)
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp; blank or missing values are `None`
pub(crate) fn parse_timestamp(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, ModelError> {
    let text = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim(),
        Some(other) => {
            return Err(ModelError::InvalidData(format!(
                "Expected an ISO-8601 date string, got {other}"
            )));
        }
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    // Date-only fields come back as `YYYY-MM-DD`
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")?;
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
}

/// A timestamp field that must be present
pub(crate) fn required_timestamp(fields: &Fields, name: &str) -> Result<DateTime<Utc>, ModelError> {
    parse_timestamp(fields.get(name))?
        .ok_or_else(|| ModelError::InvalidData(format!("Missing required field: {name}")))
}

/// Linked-record fields are always written as a single-element list
pub(crate) fn wrap_link(id: &str) -> Value {
    json!([id])
}

/// Unwrap a linked-record field; a scalar value is accepted as-is
pub(crate) fn unwrap_link(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Array(items) => items.first().and_then(|v| v.as_str()).map(str::to_string),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub(crate) fn optional_string(fields: &Fields, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn required_string(fields: &Fields, name: &str) -> Result<String, ModelError> {
    optional_string(fields, name)
        .ok_or_else(|| ModelError::InvalidData(format!("Missing required field: {name}")))
}

/// Integer field; numeric strings are accepted since text columns are common
pub(crate) fn optional_integer(fields: &Fields, name: &str) -> Result<Option<i64>, ModelError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| ModelError::InvalidData(format!("Invalid number in {name}: {n}"))),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|e| ModelError::InvalidData(format!("Invalid number in {name}: {e}"))),
        Some(other) => Err(ModelError::InvalidData(format!(
            "Invalid number in {name}: {other}"
        ))),
    }
}

/// Insert `value` under `name` if present
pub(crate) fn put_string(fields: &mut Fields, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        fields.insert(name.to_string(), Value::String(value.to_string()));
    }
}

pub(crate) fn put_timestamp(fields: &mut Fields, name: &str, value: Option<&DateTime<Utc>>) {
    if let Some(ts) = value {
        fields.insert(name.to_string(), Value::String(format_timestamp(ts)));
    }
}
