use chrono::{DateTime, SecondsFormat, Utc};

/// A database-facing value.
///
/// This is the single value representation that crosses the driver boundary
/// in both directions: the renderer produces `Value` parameter lists and the
/// drivers scan result cells back into `Value`s. Dialect-native types are
/// normalized by each driver (e.g. a `DATE` column scans as a midnight UTC
/// [`Value::Timestamp`]).
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 64-bit integer; the widest integer any dialect reports
    I64(i64),

    /// 64-bit float, also used for NUMERIC/DECIMAL scans
    F64(f64),

    /// String value
    String(String),

    /// Raw bytes
    Bytes(Vec<u8>),

    /// Point in time, always UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Renders the value the way it appears on the wire when stringified.
    ///
    /// Unique-id columns are always strings on the wire regardless of the
    /// backing native type, so every scalar variant must have a stable
    /// string form.
    pub fn to_wire_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(v) => v.to_string(),
            Self::I64(v) => v.to_string(),
            Self::F64(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Bytes(v) => String::from_utf8_lossy(v).into_owned(),
            Self::Timestamp(v) => v.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}
