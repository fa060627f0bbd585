//! Cached, per-table column metadata obtained by live introspection.

use crate::descriptor::FieldKind;

/// The nullable scan type a column classifies as.
///
/// Native type names are dialect-specific; every dialect folds them into
/// this fixed family set, defaulting to [`ScanType::Text`] for names it
/// does not recognize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanType {
    Boolean,
    Integer,
    Float,
    #[default]
    Text,
    Bytes,
    Timestamp,
}

/// A column identified by its owning table, as a structured pair rather
/// than a separator-joined string, so that column names containing any
/// candidate separator can never be misparsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// One introspected column with everything later stages need: the
/// driver-reported native type name, the dialect classification, and the
/// workflow type the descriptor declares for the field it feeds.
#[derive(Debug, Clone)]
pub struct SchemaColumn {
    pub column: QualifiedColumn,
    pub native_type: String,
    pub scan: ScanType,
    pub workflow: FieldKind,
}

/// The introspected shape of one table, or of one table joined with all of
/// its related tables (`with_relationships` cache variant).
///
/// Built once at startup by the schema catalog and read-only afterwards.
/// Column order matches the order the corresponding query template yields
/// result columns in; the row mapper depends on that alignment.
#[derive(Debug, Clone)]
pub struct SchemaMapping {
    /// The base table the mapping was built for.
    pub table: String,

    pub columns: Vec<SchemaColumn>,
}

impl SchemaMapping {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn scan_type(&self, table: &str, column: &str) -> Option<ScanType> {
        self.columns
            .iter()
            .find(|c| c.column.table == table && c.column.column == column)
            .map(|c| c.scan)
    }

    /// Contiguous per-table segments, in column order. A base mapping has a
    /// single segment; a with-relationships mapping has one per joined
    /// table, in join order.
    pub fn segments(&self) -> Vec<(&str, std::ops::Range<usize>)> {
        let mut segments: Vec<(&str, std::ops::Range<usize>)> = Vec::new();
        for (index, col) in self.columns.iter().enumerate() {
            match segments.last_mut() {
                Some((table, range)) if *table == col.column.table => {
                    range.end = index + 1;
                }
                _ => segments.push((&col.column.table, index..index + 1)),
            }
        }
        segments
    }
}

/// Cache key for a [`SchemaMapping`]: the table plus which of the two
/// variants (base or relationship-joined) is wanted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub table: String,
    pub with_relationships: bool,
}

impl SchemaKey {
    pub fn base(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            with_relationships: false,
        }
    }

    pub fn with_relationships(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            with_relationships: true,
        }
    }
}
