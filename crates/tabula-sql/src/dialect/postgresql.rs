use tabula_core::ScanType;

/// PostgreSQL type names come back lowercase from the wire protocol
/// (`int4`, `timestamptz`, ...). Families are matched by prefix.
pub(super) fn classify(native_type: &str) -> ScanType {
    let ty = native_type.to_ascii_lowercase();

    if ty.starts_with("bool") {
        ScanType::Boolean
    } else if ty.starts_with("int") || ty.starts_with("serial") || ty.starts_with("bigserial") {
        ScanType::Integer
    } else if ty.starts_with("float")
        || ty.starts_with("numeric")
        || ty.starts_with("decimal")
        || ty.starts_with("real")
        || ty.starts_with("double")
    {
        ScanType::Float
    } else if ty.starts_with("timestamp") || ty.starts_with("date") || ty.starts_with("time") {
        ScanType::Timestamp
    } else if ty.starts_with("bytea") {
        ScanType::Bytes
    } else {
        ScanType::Text
    }
}
