use chrono::SecondsFormat;
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use tabula_core::{Error, Result, Value as CoreValue};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a core value. SQLite only
    /// has four storage classes; temporal columns come back as the ISO
    /// text they were written as.
    pub fn from_sql(row: &Row, index: usize) -> Result<Self> {
        let value = row.get_ref(index).map_err(Error::backend)?;

        let core_value = match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => CoreValue::I64(value),
            ValueRef::Real(value) => CoreValue::F64(value),
            ValueRef::Text(value) => {
                CoreValue::String(String::from_utf8_lossy(value).into_owned())
            }
            ValueRef::Blob(value) => CoreValue::Bytes(value.to_vec()),
        };

        Ok(Value(core_value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match &self.0 {
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            CoreValue::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            CoreValue::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            CoreValue::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            CoreValue::Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))),
        }
    }
}
