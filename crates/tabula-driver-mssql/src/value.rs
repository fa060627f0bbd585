use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tabula_core::{Error, Result, Value as CoreValue};
use tiberius::{ColumnData, ColumnType, Row, ToSql};

#[derive(Debug)]
pub struct Value {
    inner: CoreValue,

    /// Timestamp parameters delegate to the chrono `ToSql` impl, which
    /// borrows its receiver; keeping the naive form on the wrapper gives
    /// that borrow somewhere to live.
    naive: Option<NaiveDateTime>,
}

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        let naive = match &value {
            CoreValue::Timestamp(ts) => Some(ts.naive_utc()),
            _ => None,
        };
        Self {
            inner: value,
            naive,
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> ColumnData<'_> {
        match &self.inner {
            CoreValue::Null => ColumnData::I32(None),
            CoreValue::Bool(v) => ColumnData::Bit(Some(*v)),
            CoreValue::I64(v) => ColumnData::I64(Some(*v)),
            CoreValue::F64(v) => ColumnData::F64(Some(*v)),
            CoreValue::String(v) => ColumnData::String(Some(v.as_str().into())),
            CoreValue::Bytes(v) => ColumnData::Binary(Some(v.as_slice().into())),
            CoreValue::Timestamp(_) => match &self.naive {
                Some(naive) => naive.to_sql(),
                None => ColumnData::I32(None),
            },
        }
    }
}

/// Scans one row into core values, keyed by each column's reported type.
pub(crate) fn scan_row(row: &Row) -> Result<Vec<CoreValue>> {
    let mut values = Vec::with_capacity(row.columns().len());
    let column_types: Vec<ColumnType> = row
        .columns()
        .iter()
        .map(|column| column.column_type())
        .collect();

    for (index, ty) in column_types.into_iter().enumerate() {
        values.push(scan(row, index, ty)?);
    }
    Ok(values)
}

fn scan(row: &Row, index: usize, ty: ColumnType) -> Result<CoreValue> {
    let value = match ty {
        ColumnType::Bit | ColumnType::Bitn => row
            .try_get::<bool, _>(index)
            .map_err(Error::backend)?
            .map(CoreValue::Bool),
        ColumnType::Int1 => row
            .try_get::<u8, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::I64(v as i64)),
        ColumnType::Int2 => row
            .try_get::<i16, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::I64(v as i64)),
        ColumnType::Int4 => row
            .try_get::<i32, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::I64(v as i64)),
        ColumnType::Int8 => row
            .try_get::<i64, _>(index)
            .map_err(Error::backend)?
            .map(CoreValue::I64),
        // Nullable ints decode at the width the server stored; try the
        // common widths in turn.
        ColumnType::Intn => scan_intn(row, index)?,
        ColumnType::Float4 => row
            .try_get::<f32, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::F64(v as f64)),
        ColumnType::Float8 | ColumnType::Money | ColumnType::Money4 => row
            .try_get::<f64, _>(index)
            .map_err(Error::backend)?
            .map(CoreValue::F64),
        ColumnType::Floatn => match row.try_get::<f64, _>(index) {
            Ok(v) => v.map(CoreValue::F64),
            Err(_) => row
                .try_get::<f32, _>(index)
                .map_err(Error::backend)?
                .map(|v| CoreValue::F64(v as f64)),
        },
        ColumnType::Decimaln | ColumnType::Numericn => row
            .try_get::<Decimal, _>(index)
            .map_err(Error::backend)?
            .and_then(|v| v.to_f64())
            .map(CoreValue::F64),
        ColumnType::Datetime
        | ColumnType::Datetime4
        | ColumnType::Datetimen
        | ColumnType::Datetime2 => row
            .try_get::<NaiveDateTime, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::Timestamp(v.and_utc())),
        ColumnType::DatetimeOffsetn => row
            .try_get::<DateTime<Utc>, _>(index)
            .map_err(Error::backend)?
            .map(CoreValue::Timestamp),
        ColumnType::Daten => row
            .try_get::<NaiveDate, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::Timestamp(v.and_time(NaiveTime::MIN).and_utc())),
        ColumnType::Timen => row
            .try_get::<NaiveTime, _>(index)
            .map_err(Error::backend)?
            .map(|v| {
                let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
                CoreValue::Timestamp(NaiveDateTime::new(epoch, v).and_utc())
            }),
        ColumnType::Guid => row
            .try_get::<uuid::Uuid, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::String(v.to_string())),
        ColumnType::BigBinary | ColumnType::BigVarBin | ColumnType::Image => row
            .try_get::<&[u8], _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::Bytes(v.to_vec())),
        _ => row
            .try_get::<&str, _>(index)
            .map_err(Error::backend)?
            .map(|v| CoreValue::String(v.to_string())),
    };

    Ok(value.unwrap_or(CoreValue::Null))
}

fn scan_intn(row: &Row, index: usize) -> Result<Option<CoreValue>> {
    if let Ok(v) = row.try_get::<i32, _>(index) {
        return Ok(v.map(|v| CoreValue::I64(v as i64)));
    }
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Ok(v.map(CoreValue::I64));
    }
    if let Ok(v) = row.try_get::<i16, _>(index) {
        return Ok(v.map(|v| CoreValue::I64(v as i64)));
    }
    row.try_get::<u8, _>(index)
        .map_err(Error::backend)
        .map(|v| v.map(|v| CoreValue::I64(v as i64)))
}

/// Canonical type name for a reported column type; the dialect's
/// classifier works on these names.
pub(crate) fn type_name(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Null => "sql_variant",
        ColumnType::Bit | ColumnType::Bitn => "bit",
        ColumnType::Int1 => "tinyint",
        ColumnType::Int2 => "smallint",
        ColumnType::Int4 | ColumnType::Intn => "int",
        ColumnType::Int8 => "bigint",
        ColumnType::Float4 => "real",
        ColumnType::Float8 | ColumnType::Floatn => "float",
        ColumnType::Money => "money",
        ColumnType::Money4 => "smallmoney",
        ColumnType::Decimaln => "decimal",
        ColumnType::Numericn => "numeric",
        ColumnType::Datetime | ColumnType::Datetimen => "datetime",
        ColumnType::Datetime4 => "smalldatetime",
        ColumnType::Datetime2 => "datetime2",
        ColumnType::DatetimeOffsetn => "datetimeoffset",
        ColumnType::Daten => "date",
        ColumnType::Timen => "time",
        ColumnType::Guid => "uniqueidentifier",
        ColumnType::BigChar => "char",
        ColumnType::BigVarChar => "varchar",
        ColumnType::NChar => "nchar",
        ColumnType::NVarchar => "nvarchar",
        ColumnType::Text => "text",
        ColumnType::NText => "ntext",
        ColumnType::Xml => "xml",
        ColumnType::BigBinary => "binary",
        ColumnType::BigVarBin => "varbinary",
        ColumnType::Image => "image",
        _ => "sql_variant",
    }
}
