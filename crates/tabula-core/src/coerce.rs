//! Inbound type coercion: wire values into driver argument values.
//!
//! Outbound formatting (scan values back into wire JSON) lives with the row
//! mapper in the engine crate; the two directions share [`WIRE_TIME_FORMAT`].

use crate::descriptor::FieldKind;
use crate::{Error, Result, ScanType, Value};

use chrono::{DateTime, NaiveDateTime, Utc};

/// The one accepted wire format for date, datetime, and time values:
/// ISO-8601 with millisecond precision and a literal trailing `Z`.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Parses a wire timestamp. Anything but the fixed format is rejected.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, WIRE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::bad_request(format!("invalid timestamp value '{raw}'")))
}

/// Coerces one JSON payload scalar into a driver argument.
///
/// Explicit `null` passes through as SQL NULL. Absence of a key never
/// reaches this function; the renderer skips absent fields entirely.
pub fn json_to_value(kind: FieldKind, json: &serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(v) => Ok(Value::Bool(*v)),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::I64(v))
            } else if let Some(v) = n.as_f64() {
                Ok(Value::F64(v))
            } else {
                Err(Error::bad_request(format!("unrepresentable number {n}")))
            }
        }
        serde_json::Value::String(v) if kind.is_temporal() => {
            Ok(Value::Timestamp(parse_timestamp(v)?))
        }
        serde_json::Value::String(v) => Ok(Value::String(v.clone())),
        other => Err(Error::bad_request(format!(
            "expected a scalar value, got {other}"
        ))),
    }
}

/// Coerces a raw request string (a path id or a filter operand) into the
/// argument type the target column scans as.
pub fn string_to_value(scan: ScanType, raw: &str) -> Result<Value> {
    match scan {
        ScanType::Integer => raw
            .parse::<i64>()
            .map(Value::I64)
            .map_err(|_| Error::bad_request(format!("'{raw}' is not an integer"))),
        ScanType::Float => raw
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| Error::bad_request(format!("'{raw}' is not a number"))),
        ScanType::Boolean => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(Error::bad_request(format!("'{raw}' is not a boolean"))),
        },
        ScanType::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
        ScanType::Text | ScanType::Bytes => Ok(Value::String(raw.to_string())),
    }
}
