use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{private::BytesMut, IsNull, ToSql, Type};
use postgres::Row;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tabula_core::{Error, Result, Value as CoreValue};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

/// Scans one cell into a core value, keyed by the column's wire type.
pub(crate) fn scan(row: &Row, index: usize) -> Result<CoreValue> {
    let ty = row.columns()[index].type_();

    let value = match *ty {
        Type::BOOL => row
            .try_get::<_, Option<bool>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::Bool),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::I64(v as i64)),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::I64(v as i64)),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::I64),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::F64(v as f64)),
        Type::FLOAT8 => row
            .try_get::<_, Option<f64>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::F64),
        Type::NUMERIC => row
            .try_get::<_, Option<Decimal>>(index)
            .map_err(Error::backend)?
            .and_then(|v| v.to_f64())
            .map(CoreValue::F64),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::Timestamp(v.and_utc())),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::Timestamp),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::Timestamp(v.and_time(NaiveTime::MIN).and_utc())),
        Type::TIME => row
            .try_get::<_, Option<NaiveTime>>(index)
            .map_err(Error::backend)?
            .map(|v| {
                CoreValue::Timestamp(NaiveDateTime::new(epoch_date(), v).and_utc())
            }),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::String(v.to_string())),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::String(v.to_string())),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::Bytes),
        _ => row
            .try_get::<_, Option<String>>(index)
            .map_err(Error::backend)?
            .map(CoreValue::String),
    };

    Ok(value.unwrap_or(CoreValue::Null))
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql(ty, out),
            CoreValue::I64(value) => match *ty {
                Type::INT2 => (*value as i16).to_sql(ty, out),
                Type::INT4 => (*value as i32).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*value).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*value)
                    .map_err(|err| {
                        Box::new(err) as Box<dyn std::error::Error + Sync + Send>
                    })?
                    .to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::String(value) => match *ty {
                Type::UUID => value
                    .parse::<uuid::Uuid>()
                    .map_err(|err| {
                        Box::new(err) as Box<dyn std::error::Error + Sync + Send>
                    })?
                    .to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::Bytes(value) => value.to_sql(ty, out),
            CoreValue::Timestamp(value) => match *ty {
                Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
                Type::DATE => value.date_naive().to_sql(ty, out),
                Type::TIME => value.time().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    postgres::types::to_sql_checked!();
}
