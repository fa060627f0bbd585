use tabula_core::descriptor::TypeDescriptor;
use tabula_core::driver::{ColumnMeta, Connection};
use tabula_core::schema::{QualifiedColumn, SchemaColumn, SchemaKey, SchemaMapping};
use tabula_core::{Descriptor, Dialect, Error, Result, ScanType};
use tabula_sql::{DialectExt, Operation, Renderer};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

/// Cached schema mappings for every mapped table, built once before the
/// server accepts traffic and read-only afterwards.
pub struct Catalog {
    mappings: HashMap<SchemaKey, Arc<SchemaMapping>>,
}

impl Catalog {
    /// Introspects every table the descriptor maps.
    ///
    /// Explicitly two-phase: phase 1 probes each base table; phase 2 probes
    /// each relationship-bearing table through its joined query and splits
    /// the combined column list by the related tables' already-cached
    /// column counts. Phase 2 therefore never runs before every base table
    /// it depends on is cached.
    pub fn build(
        descriptor: &Descriptor,
        dialect: Dialect,
        conn: &mut dyn Connection,
    ) -> Result<Self> {
        let mut mappings = HashMap::new();

        for td in &descriptor.type_descriptors {
            let mapping = introspect_base(descriptor, dialect, conn, td)?;
            mappings.insert(SchemaKey::base(&td.table_name), Arc::new(mapping));
        }
        info!(
            tables = descriptor.type_descriptors.len(),
            "schema catalog: base tables introspected"
        );

        for td in &descriptor.type_descriptors {
            if !td.has_relationships() {
                continue;
            }
            let mapping = introspect_joined(descriptor, dialect, conn, td, &mappings)?;
            mappings.insert(
                SchemaKey::with_relationships(&td.table_name),
                Arc::new(mapping),
            );
        }
        info!("schema catalog: relationship joins introspected");

        Ok(Self { mappings })
    }

    /// The mapping a read operation scans rows against.
    pub fn mapping(&self, table: &str, with_relationships: bool) -> Result<&Arc<SchemaMapping>> {
        let key = SchemaKey {
            table: table.to_string(),
            with_relationships,
        };
        self.mappings.get(&key).ok_or_else(|| {
            Error::schema(format!("no cached schema mapping for table '{table}'"))
        })
    }

    /// Scan type of one base-table column, for coercing ids and filter
    /// operands. `None` means the column does not exist.
    pub fn scan_type(&self, table: &str, column: &str) -> Option<ScanType> {
        self.mappings
            .get(&SchemaKey::base(table))
            .and_then(|mapping| mapping.scan_type(table, column))
    }
}

fn introspect_base(
    descriptor: &Descriptor,
    dialect: Dialect,
    conn: &mut dyn Connection,
    td: &TypeDescriptor,
) -> Result<SchemaMapping> {
    let rendered = Renderer::new(dialect, descriptor, td).render(Operation::GetTableSchema)?;
    debug!(table = %td.table_name, sql = %rendered.sql, "introspecting base table");

    let output = conn.query(&rendered.sql, &rendered.params)?;
    if output.columns.is_empty() {
        return Err(Error::schema(format!(
            "introspection returned no columns for table '{}'",
            td.table_name
        )));
    }

    Ok(SchemaMapping {
        table: td.table_name.clone(),
        columns: classify_segment(dialect, td, &output.columns),
    })
}

fn introspect_joined(
    descriptor: &Descriptor,
    dialect: Dialect,
    conn: &mut dyn Connection,
    td: &TypeDescriptor,
    cache: &HashMap<SchemaKey, Arc<SchemaMapping>>,
) -> Result<SchemaMapping> {
    let rendered =
        Renderer::new(dialect, descriptor, td).render(Operation::GetTableWithRelationshipsSchema)?;
    debug!(table = %td.table_name, sql = %rendered.sql, "introspecting relationship join");

    let output = conn.query(&rendered.sql, &rendered.params)?;

    // The joined column list splits back into per-table runs: the base
    // table's columns first, then each related table's, in field order.
    let mut tables = vec![td.table_name.as_str()];
    for field in &td.fields {
        if let Some(rel) = field.relationship.as_ref() {
            tables.push(rel.with_table.as_str());
        }
    }

    let mut columns = Vec::with_capacity(output.columns.len());
    let mut offset = 0;
    for table in tables {
        let base = cache.get(&SchemaKey::base(table)).ok_or_else(|| {
            Error::schema(format!(
                "base mapping for related table '{table}' missing while joining '{}'",
                td.table_name
            ))
        })?;
        let owner = descriptor.type_descriptor_by_table(table).ok_or_else(|| {
            Error::schema(format!("no type descriptor maps table '{table}'"))
        })?;

        let end = offset + base.len();
        if end > output.columns.len() {
            return Err(Error::schema(format!(
                "joined introspection of '{}' returned {} columns, expected at least {end}",
                td.table_name,
                output.columns.len()
            )));
        }
        columns.extend(classify_segment(
            dialect,
            owner,
            &output.columns[offset..end],
        ));
        offset = end;
    }

    if offset != output.columns.len() {
        return Err(Error::schema(format!(
            "joined introspection of '{}' returned {} columns, expected {offset}",
            td.table_name,
            output.columns.len()
        )));
    }

    Ok(SchemaMapping {
        table: td.table_name.clone(),
        columns,
    })
}

/// Pairs one table's reported columns with the workflow types the
/// descriptor declares for them. Columns no field feeds stay plain text.
fn classify_segment(
    dialect: Dialect,
    owner: &TypeDescriptor,
    columns: &[ColumnMeta],
) -> Vec<SchemaColumn> {
    columns
        .iter()
        .map(|meta| SchemaColumn {
            column: QualifiedColumn::new(&owner.table_name, &meta.name),
            scan: dialect.classify(&meta.native_type),
            native_type: meta.native_type.clone(),
            workflow: owner
                .field_by_column(&meta.name)
                .map(|field| field.ty.kind)
                .unwrap_or_default(),
        })
        .collect()
}
