mod field;
pub use field::{Amount, Currency, Field, FieldKind, FieldType};

mod relationship;
pub use relationship::{Relationship, RelationshipKind};

mod type_descriptor;
pub use type_descriptor::TypeDescriptor;

use crate::{Error, Result};

use serde::Deserialize;

/// The declarative document mapping REST resources onto physical tables.
///
/// A descriptor is loaded once at startup and is read-only afterwards.
/// Loading performs structural parsing followed by normalization (id field
/// synthesis) and validation; any failure is fatal — the process must not
/// serve traffic against a descriptor it could not fully load.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub key: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub type_descriptors: Vec<TypeDescriptor>,

    /// The document as it appeared on disk, served verbatim at `GET /`.
    #[serde(skip)]
    raw: serde_json::Value,
}

impl Descriptor {
    /// Parses and validates a descriptor document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(bytes).map_err(Error::parse)?;
        let mut descriptor: Self =
            serde_json::from_value(raw.clone()).map_err(Error::parse)?;
        descriptor.raw = raw;

        for td in &mut descriptor.type_descriptors {
            td.synthesize_id_field();
            td.validate()?;
        }

        Ok(descriptor)
    }

    /// The original document, for serving as a static asset.
    pub fn to_json(&self) -> &serde_json::Value {
        &self.raw
    }

    /// Resolves a resource key from the request path.
    pub fn type_descriptor(&self, key: &str) -> Option<&TypeDescriptor> {
        self.type_descriptors.iter().find(|td| td.key == key)
    }

    /// Resolves a physical table name, used when following relationships.
    pub fn type_descriptor_by_table(&self, table: &str) -> Option<&TypeDescriptor> {
        self.type_descriptors
            .iter()
            .find(|td| td.table_name == table)
    }
}
