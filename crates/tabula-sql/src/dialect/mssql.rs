use tabula_core::ScanType;

/// SQL Server type names as canonicalized by the mssql driver crate.
pub(super) fn classify(native_type: &str) -> ScanType {
    let ty = native_type.to_ascii_lowercase();

    if ty.starts_with("bit") {
        ScanType::Boolean
    } else if ty.starts_with("tinyint")
        || ty.starts_with("smallint")
        || ty.starts_with("int")
        || ty.starts_with("bigint")
    {
        ScanType::Integer
    } else if ty.starts_with("decimal")
        || ty.starts_with("numeric")
        || ty.starts_with("money")
        || ty.starts_with("smallmoney")
        || ty.starts_with("float")
        || ty.starts_with("real")
    {
        ScanType::Float
    } else if ty.starts_with("date") || ty.starts_with("smalldatetime") || ty.starts_with("time") {
        // covers date, datetime, datetime2, datetimeoffset
        ScanType::Timestamp
    } else if ty.starts_with("binary") || ty.starts_with("varbinary") || ty.starts_with("image") {
        ScanType::Bytes
    } else {
        ScanType::Text
    }
}
