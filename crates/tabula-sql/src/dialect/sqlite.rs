use tabula_core::ScanType;

/// SQLite reports declared column types, and its affinity rules match on
/// substrings rather than exact names (a column declared `VARCHAR(10)` has
/// TEXT affinity). Classification follows the same containment convention.
pub(super) fn classify(native_type: &str) -> ScanType {
    let ty = native_type.to_ascii_uppercase();

    if ty.contains("BOOL") {
        ScanType::Boolean
    } else if ty.contains("DATE") || ty.contains("TIME") {
        ScanType::Timestamp
    } else if ty.contains("INT") {
        ScanType::Integer
    } else if ty.contains("CHAR") || ty.contains("CLOB") || ty.contains("TEXT") {
        ScanType::Text
    } else if ty.contains("BLOB") {
        ScanType::Bytes
    } else if ty.contains("REAL")
        || ty.contains("FLOA")
        || ty.contains("DOUB")
        || ty.contains("DEC")
        || ty.contains("NUM")
    {
        ScanType::Float
    } else {
        ScanType::Text
    }
}
