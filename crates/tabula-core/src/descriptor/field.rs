use super::Relationship;

use serde::Deserialize;

/// One wire-visible field of a resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Wire name; responses are keyed by this, never by the source column.
    pub key: String,

    /// Display name
    pub name: String,

    /// Source column. Absent for money fields (the amount/currency specs
    /// carry their own columns) and for relationship fields.
    #[serde(default)]
    pub from_column: Option<String>,

    #[serde(rename = "type", default)]
    pub ty: FieldType,

    #[serde(default)]
    pub relationship: Option<Relationship>,
}

impl Field {
    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    pub fn is_money(&self) -> bool {
        self.ty.kind == FieldKind::Money
    }
}

/// The wire-visible type of a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub kind: FieldKind,

    /// Money only: where the numeric amount lives.
    #[serde(default)]
    pub amount: Option<Amount>,

    /// Money only: where the currency code comes from.
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// Kind tag of a [`FieldType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Money,
    Date,
    DateTime,
    Time,
}

impl FieldKind {
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Time)
    }
}

/// The amount half of a money field.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amount {
    pub key: String,
    pub from_column: String,
}

/// The currency half of a money field: either read from a column or fixed
/// to a literal value. Exactly one of the two must be set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub key: String,

    #[serde(default)]
    pub from_column: Option<String>,

    #[serde(default)]
    pub value: Option<String>,
}
