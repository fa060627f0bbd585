use serde::Deserialize;

/// A declared join between two resources.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub kind: RelationshipKind,

    /// Physical name of the related table.
    pub with_table: String,

    /// Join column on the owning table's side.
    #[serde(rename = "localTableUniqueIdColumn")]
    pub local_column: String,

    /// Join column on the related table's side.
    #[serde(rename = "foreignTableUniqueIdColumn")]
    pub foreign_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    OneToMany,
    ManyToOne,
    OneToOne,
}

impl RelationshipKind {
    /// Whether the resolved wire value is a collection rather than a single
    /// nested object.
    pub fn is_collection(self) -> bool {
        matches!(self, Self::OneToMany)
    }
}
