use tabula_core::ScanType;

/// Oracle reports uppercase names. There is no integer family; `NUMBER`
/// covers every numeric column and scans as a float.
pub(super) fn classify(native_type: &str) -> ScanType {
    let ty = native_type.to_ascii_uppercase();

    if ty.starts_with("NUMBER")
        || ty.starts_with("FLOAT")
        || ty.starts_with("BINARY_FLOAT")
        || ty.starts_with("BINARY_DOUBLE")
    {
        ScanType::Float
    } else if ty.starts_with("DATE") || ty.starts_with("TIMESTAMP") {
        ScanType::Timestamp
    } else if ty.starts_with("RAW") || ty.starts_with("LONG RAW") || ty.starts_with("BLOB") {
        ScanType::Bytes
    } else {
        ScanType::Text
    }
}
