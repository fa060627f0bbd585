use super::{Field, FieldKind, FieldType};
use crate::{Error, Result};

use serde::Deserialize;

/// One resource definition within a [`Descriptor`](super::super::Descriptor).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Resource name used in routes.
    pub key: String,

    /// Display name
    pub name: String,

    /// Physical table the resource maps onto.
    pub table_name: String,

    /// Column whose value serves as the option display name.
    #[serde(default)]
    pub column_as_option_name: String,

    /// Column holding the unique id.
    pub unique_id_column: String,

    #[serde(default)]
    pub fields: Vec<Field>,

    /// Whether the option routes are enabled for this resource.
    #[serde(default)]
    pub options_available: bool,

    /// Whether the fetch-one route is enabled for this resource.
    #[serde(default)]
    pub fetch_one_available: bool,
}

impl TypeDescriptor {
    /// Appends the implicit id field when the descriptor does not declare
    /// one. Every resource is addressable by id, whether or not the
    /// document says so.
    pub(super) fn synthesize_id_field(&mut self) {
        if self.fields.iter().any(Self::is_id_field) {
            return;
        }

        self.fields.push(Field {
            key: "id".to_string(),
            name: "Id".to_string(),
            from_column: Some("id".to_string()),
            ty: FieldType {
                name: "Text".to_string(),
                kind: FieldKind::Text,
                amount: None,
                currency: None,
            },
            relationship: None,
        });
    }

    fn is_id_field(field: &Field) -> bool {
        field.key == "id" || field.from_column.as_deref() == Some("id")
    }

    pub(super) fn validate(&self) -> Result<()> {
        let id_fields = self.fields.iter().filter(|f| Self::is_id_field(f)).count();
        if id_fields != 1 {
            return Err(Error::validation(format!(
                "type descriptor '{}' must have exactly one id field, found {id_fields}",
                self.key
            )));
        }

        for field in &self.fields {
            if field.is_relationship() {
                continue;
            }

            if field.is_money() {
                let Some(currency) = field.ty.currency.as_ref() else {
                    return Err(Error::validation(format!(
                        "money field '{}.{}' is missing its currency spec",
                        self.key, field.key
                    )));
                };
                match (&currency.from_column, &currency.value) {
                    (Some(_), None) | (None, Some(_)) => {}
                    _ => {
                        return Err(Error::validation(format!(
                            "money field '{}.{}' must set exactly one of \
                             currency.fromColumn and currency.value",
                            self.key, field.key
                        )));
                    }
                }
                if field.ty.amount.is_none() {
                    return Err(Error::validation(format!(
                        "money field '{}.{}' is missing its amount spec",
                        self.key, field.key
                    )));
                }
            } else if field.from_column.is_none() {
                return Err(Error::validation(format!(
                    "field '{}.{}' does not declare a source column",
                    self.key, field.key
                )));
            }
        }

        Ok(())
    }

    /// Fields that declare a relationship, in declaration order.
    pub fn relationship_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    pub fn has_relationships(&self) -> bool {
        self.fields.iter().any(Field::is_relationship)
    }

    /// Looks up the field a physical column feeds, if any. Money columns
    /// resolve through their amount/currency specs.
    pub fn field_by_column(&self, column: &str) -> Option<&Field> {
        self.fields.iter().find(|f| {
            if f.from_column.as_deref() == Some(column) {
                return true;
            }
            if let Some(amount) = f.ty.amount.as_ref() {
                if amount.from_column == column {
                    return true;
                }
            }
            if let Some(currency) = f.ty.currency.as_ref() {
                if currency.from_column.as_deref() == Some(column) {
                    return true;
                }
            }
            false
        })
    }
}
