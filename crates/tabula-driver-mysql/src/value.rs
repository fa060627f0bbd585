use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql::consts::ColumnType;
use mysql::Value as SqlValue;
use tabula_core::Value as CoreValue;

/// Positional parameters for one statement.
pub(crate) fn to_params(params: &[CoreValue]) -> mysql::Params {
    if params.is_empty() {
        return mysql::Params::Empty;
    }
    mysql::Params::Positional(params.iter().map(to_sql).collect())
}

fn to_sql(value: &CoreValue) -> SqlValue {
    match value {
        CoreValue::Null => SqlValue::NULL,
        CoreValue::Bool(v) => SqlValue::Int(*v as i64),
        CoreValue::I64(v) => SqlValue::Int(*v),
        CoreValue::F64(v) => SqlValue::Double(*v),
        CoreValue::String(v) => SqlValue::Bytes(v.as_bytes().to_vec()),
        CoreValue::Bytes(v) => SqlValue::Bytes(v.clone()),
        CoreValue::Timestamp(v) => {
            let naive = v.naive_utc();
            SqlValue::Date(
                naive.year() as u16,
                naive.month() as u8,
                naive.day() as u8,
                naive.hour() as u8,
                naive.minute() as u8,
                naive.second() as u8,
                naive.and_utc().timestamp_subsec_micros(),
            )
        }
    }
}

/// Scans one row into core values. Text-protocol results arrive as bytes;
/// anything that decodes as UTF-8 is a string.
pub(crate) fn scan_row(row: mysql::Row) -> Vec<CoreValue> {
    row.unwrap().into_iter().map(from_sql).collect()
}

fn from_sql(value: SqlValue) -> CoreValue {
    match value {
        SqlValue::NULL => CoreValue::Null,
        SqlValue::Int(v) => CoreValue::I64(v),
        SqlValue::UInt(v) => CoreValue::I64(v as i64),
        SqlValue::Float(v) => CoreValue::F64(v as f64),
        SqlValue::Double(v) => CoreValue::F64(v),
        SqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(text) => CoreValue::String(text),
            Err(err) => CoreValue::Bytes(err.into_bytes()),
        },
        SqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            let time = NaiveTime::from_hms_micro_opt(
                hour as u32,
                minute as u32,
                second as u32,
                micros,
            );
            match (date, time) {
                (Some(date), Some(time)) => {
                    CoreValue::Timestamp(NaiveDateTime::new(date, time).and_utc())
                }
                _ => CoreValue::Null,
            }
        }
        SqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_seconds = (days as u64) * 86_400
                + (hours as u64) * 3_600
                + (minutes as u64) * 60
                + seconds as u64;
            let signed = if negative {
                -(total_seconds as i64)
            } else {
                total_seconds as i64
            };
            let base = NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_time(NaiveTime::MIN)
                .and_utc();
            CoreValue::Timestamp(
                base + chrono::Duration::seconds(signed)
                    + chrono::Duration::microseconds(micros as i64),
            )
        }
    }
}

/// Canonical type name for a reported column type code; the dialect's
/// classifier works on these names.
pub(crate) fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::MYSQL_TYPE_TINY => "TINYINT",
        ColumnType::MYSQL_TYPE_SHORT => "SMALLINT",
        ColumnType::MYSQL_TYPE_INT24 => "MEDIUMINT",
        ColumnType::MYSQL_TYPE_LONG => "INT",
        ColumnType::MYSQL_TYPE_LONGLONG => "BIGINT",
        ColumnType::MYSQL_TYPE_FLOAT => "FLOAT",
        ColumnType::MYSQL_TYPE_DOUBLE => "DOUBLE",
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => "DECIMAL",
        ColumnType::MYSQL_TYPE_TIMESTAMP | ColumnType::MYSQL_TYPE_TIMESTAMP2 => "TIMESTAMP",
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_DATETIME2 => "DATETIME",
        ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE => "DATE",
        ColumnType::MYSQL_TYPE_TIME | ColumnType::MYSQL_TYPE_TIME2 => "TIME",
        ColumnType::MYSQL_TYPE_YEAR => "YEAR",
        ColumnType::MYSQL_TYPE_BIT => "BIT",
        ColumnType::MYSQL_TYPE_STRING => "CHAR",
        ColumnType::MYSQL_TYPE_VARCHAR | ColumnType::MYSQL_TYPE_VAR_STRING => "VARCHAR",
        ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB => "TEXT",
        ColumnType::MYSQL_TYPE_JSON => "JSON",
        _ => "TEXT",
    }
}
