use tabula_core::ScanType;

/// MySQL's driver reports type codes; the driver crate canonicalizes them
/// to the uppercase names used here.
pub(super) fn classify(native_type: &str) -> ScanType {
    let ty = native_type.to_ascii_uppercase();

    if ty.starts_with("BIT") || ty.starts_with("BOOL") {
        ScanType::Boolean
    } else if ty.starts_with("TINYINT")
        || ty.starts_with("SMALLINT")
        || ty.starts_with("MEDIUMINT")
        || ty.starts_with("INT")
        || ty.starts_with("BIGINT")
        || ty.starts_with("YEAR")
    {
        ScanType::Integer
    } else if ty.starts_with("DECIMAL") || ty.starts_with("FLOAT") || ty.starts_with("DOUBLE") {
        ScanType::Float
    } else if ty.starts_with("DATETIME")
        || ty.starts_with("TIMESTAMP")
        || ty.starts_with("DATE")
        || ty.starts_with("TIME")
    {
        ScanType::Timestamp
    } else if ty.starts_with("BINARY") || ty.starts_with("VARBINARY") || ty.starts_with("BLOB") {
        ScanType::Bytes
    } else {
        ScanType::Text
    }
}
