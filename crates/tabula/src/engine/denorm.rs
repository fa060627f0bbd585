//! Splitting flat joined rows back into per-table sub-objects, and the
//! deduplication that collapses join fan-out.

use tabula_core::{SchemaMapping, Value};

/// One table's slice of a scanned row: column name → scanned value, in
/// mapping order.
pub(crate) type RawObject = Vec<(String, Value)>;

/// One scanned row, split into per-table segments. Fan-out duplicates are
/// still present at this stage.
#[derive(Debug)]
pub(crate) struct MappedRow {
    pub segments: Vec<(String, RawObject)>,
}

impl MappedRow {
    pub fn segment(&self, table: &str) -> Option<&RawObject> {
        self.segments
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, values)| values)
    }
}

/// Walks the mapping's columns left to right, accumulating values into one
/// sub-object per contiguous table run.
pub(crate) fn map_row(mapping: &SchemaMapping, row: &[Value]) -> MappedRow {
    let segments = mapping
        .segments()
        .into_iter()
        .map(|(table, range)| {
            let values = range
                .clone()
                .map(|index| {
                    (
                        mapping.columns[index].column.column.clone(),
                        row.get(index).cloned().unwrap_or_default(),
                    )
                })
                .collect();
            (table.to_string(), values)
        })
        .collect();

    MappedRow { segments }
}

/// Whether a sub-object is the LEFT-JOIN-no-match case: every value null
/// or empty.
pub(crate) fn is_vacant(values: &RawObject) -> bool {
    values
        .iter()
        .all(|(_, value)| value.is_null() || value.as_str() == Some(""))
}

/// Order-preserving distinct. Relationship collections are small; the
/// quadratic scan beats hashing serde values.
pub(crate) fn dedupe(objects: Vec<serde_json::Value>) -> Vec<serde_json::Value> {
    let mut distinct: Vec<serde_json::Value> = Vec::new();
    for object in objects {
        if !distinct.contains(&object) {
            distinct.push(object);
        }
    }
    distinct
}
