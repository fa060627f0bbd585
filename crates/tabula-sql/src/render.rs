//! The query template engine: renders a logical operation against one
//! resource into a concrete SQL string plus its ordered argument list.

use crate::dialect::DialectExt;

use tabula_core::coerce;
use tabula_core::descriptor::{FieldKind, Relationship, TypeDescriptor};
use tabula_core::{Descriptor, Dialect, Error, Result, Value};

/// The logical operations the REST surface maps onto.
#[derive(Debug)]
pub enum Operation<'a> {
    GetSingle {
        id: Value,
    },
    GetCollection,
    GetCollectionFiltered {
        column: &'a str,
        value: Value,
    },
    GetSingleAsOption {
        id: Value,
    },
    GetCollectionAsOptions,
    GetCollectionAsOptionsFiltered {
        pattern: &'a str,
    },
    CreateSingle {
        payload: &'a serde_json::Map<String, serde_json::Value>,
    },
    UpdateSingle {
        id: Value,
        payload: &'a serde_json::Map<String, serde_json::Value>,
    },
    DeleteSingle {
        id: Value,
    },
    GetTableSchema,
    GetTableWithRelationshipsSchema,
}

/// A rendered statement: SQL text and the placeholder-aligned arguments.
#[derive(Debug)]
pub struct Rendered {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders operations for one resource under one dialect.
pub struct Renderer<'a> {
    dialect: Dialect,
    descriptor: &'a Descriptor,
    td: &'a TypeDescriptor,
}

/// Accumulates SQL text and parameters, keeping placeholder numbering and
/// argument position in lockstep.
struct Fmt {
    dialect: Dialect,
    sql: String,
    params: Vec<Value>,
}

impl Fmt {
    fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    fn ident(&mut self, name: &str) {
        self.dialect.write_ident(&mut self.sql, name);
    }

    fn qualified(&mut self, table: &str, column: &str) {
        self.ident(table);
        self.sql.push('.');
        self.ident(column);
    }

    /// Binds one argument and writes its placeholder. Temporal values get
    /// the dialect's cast wrapper, applied after positional assignment.
    fn bind(&mut self, value: Value) {
        let mut placeholder = String::new();
        self.dialect
            .write_placeholder(&mut placeholder, self.params.len() + 1);
        if matches!(value, Value::Timestamp(_)) {
            placeholder = self.dialect.temporal_placeholder(placeholder);
        }
        self.sql.push_str(&placeholder);
        self.params.push(value);
    }

    fn finish(self) -> Rendered {
        Rendered {
            sql: self.sql,
            params: self.params,
        }
    }
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: Dialect, descriptor: &'a Descriptor, td: &'a TypeDescriptor) -> Self {
        Self {
            dialect,
            descriptor,
            td,
        }
    }

    pub fn render(&self, op: Operation<'_>) -> Result<Rendered> {
        let mut f = Fmt::new(self.dialect);

        match op {
            Operation::GetSingle { id } => {
                self.push_select(&mut f, false)?;
                f.push(" WHERE ");
                f.qualified(&self.td.table_name, &self.td.unique_id_column);
                f.push(" = ");
                f.bind(id);
            }
            Operation::GetCollection => {
                self.push_select(&mut f, false)?;
            }
            Operation::GetCollectionFiltered { column, value } => {
                self.push_select(&mut f, false)?;
                f.push(" WHERE ");
                f.qualified(&self.td.table_name, column);
                f.push(" = ");
                f.bind(value);
            }
            Operation::GetSingleAsOption { id } => {
                self.push_option_select(&mut f);
                f.push(" WHERE ");
                f.ident(&self.td.unique_id_column);
                f.push(" = ");
                f.bind(id);
            }
            Operation::GetCollectionAsOptions => {
                self.push_option_select(&mut f);
            }
            Operation::GetCollectionAsOptionsFiltered { pattern } => {
                self.push_option_select(&mut f);
                f.push(" WHERE ");
                f.ident(&self.td.column_as_option_name);
                f.push(" LIKE ");
                f.bind(Value::String(format!("%{pattern}%")));
            }
            Operation::CreateSingle { payload } => {
                self.push_insert(&mut f, payload)?;
            }
            Operation::UpdateSingle { id, payload } => {
                self.push_update(&mut f, id, payload)?;
            }
            Operation::DeleteSingle { id } => {
                f.push("DELETE FROM ");
                f.ident(&self.td.table_name);
                f.push(" WHERE ");
                f.ident(&self.td.unique_id_column);
                f.push(" = ");
                f.bind(id);
            }
            Operation::GetTableSchema => {
                self.push_schema_select(&mut f, false)?;
            }
            Operation::GetTableWithRelationshipsSchema => {
                self.push_schema_select(&mut f, true)?;
            }
        }

        Ok(f.finish())
    }

    /// Resolves each relationship field to its related type descriptor.
    /// Order matters: joined result columns appear in this order, and the
    /// schema catalog splits them back by the same order.
    fn joins(&self) -> Result<Vec<(&'a Relationship, &'a TypeDescriptor)>> {
        let mut joins = Vec::new();
        for field in &self.td.fields {
            let Some(rel) = field.relationship.as_ref() else {
                continue;
            };
            let related = self
                .descriptor
                .type_descriptor_by_table(&rel.with_table)
                .ok_or_else(|| {
                    Error::template(format!(
                        "relationship table '{}' is not declared by the descriptor",
                        rel.with_table
                    ))
                })?;
            joins.push((rel, related));
        }
        Ok(joins)
    }

    fn push_select(&self, f: &mut Fmt, limit_one: bool) -> Result<()> {
        let joins = self.joins()?;

        f.push("SELECT ");
        if limit_one && self.dialect == Dialect::Mssql {
            f.push("TOP 1 ");
        }

        if joins.is_empty() {
            f.push("*");
        } else {
            f.ident(&self.td.table_name);
            f.push(".*");
        }
        for (_, related) in &joins {
            f.push(", ");
            f.ident(&related.table_name);
            f.push(".*");
        }

        f.push(" FROM ");
        f.ident(&self.td.table_name);

        for (rel, related) in &joins {
            f.push(" LEFT JOIN ");
            f.ident(&related.table_name);
            f.push(" ON ");
            f.qualified(&related.table_name, &rel.foreign_column);
            f.push(" = ");
            f.qualified(&self.td.table_name, &rel.local_column);
        }

        if limit_one {
            match self.dialect {
                Dialect::Mssql => {}
                Dialect::Oracle => f.push(" WHERE ROWNUM <= 1"),
                _ => f.push(" LIMIT 1"),
            }
        }

        Ok(())
    }

    fn push_option_select(&self, f: &mut Fmt) {
        f.push("SELECT ");
        f.ident(&self.td.unique_id_column);
        f.push(", ");
        f.ident(&self.td.column_as_option_name);
        f.push(" FROM ");
        f.ident(&self.td.table_name);
    }

    /// Schema introspection: limit-one semantics so no data volume moves,
    /// column metadata is all that is read back.
    fn push_schema_select(&self, f: &mut Fmt, with_relationships: bool) -> Result<()> {
        if with_relationships {
            self.push_select(f, true)
        } else {
            f.push("SELECT ");
            if self.dialect == Dialect::Mssql {
                f.push("TOP 1 ");
            }
            f.push("* FROM ");
            f.ident(&self.td.table_name);
            match self.dialect {
                Dialect::Mssql => {}
                Dialect::Oracle => f.push(" WHERE ROWNUM <= 1"),
                _ => f.push(" LIMIT 1"),
            }
            Ok(())
        }
    }

    fn push_insert(
        &self,
        f: &mut Fmt,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let assignments = self.payload_columns(payload)?;

        f.push("INSERT INTO ");
        f.ident(&self.td.table_name);
        f.push(" (");
        for (index, (column, _)) in assignments.iter().enumerate() {
            if index > 0 {
                f.push(", ");
            }
            f.ident(column);
        }
        f.push(")");

        // SQL Server reads the generated id through an OUTPUT clause, which
        // sits between the column list and VALUES.
        if self.dialect == Dialect::Mssql {
            f.push(" OUTPUT INSERTED.");
            f.ident(&self.td.unique_id_column);
        }

        f.push(" VALUES (");
        for (index, (_, value)) in assignments.into_iter().enumerate() {
            if index > 0 {
                f.push(", ");
            }
            f.bind(value);
        }
        f.push(")");

        if self.dialect == Dialect::Postgresql {
            f.push(" RETURNING ");
            f.ident(&self.td.unique_id_column);
        }

        Ok(())
    }

    fn push_update(
        &self,
        f: &mut Fmt,
        id: Value,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let assignments = self.payload_columns(payload)?;

        f.push("UPDATE ");
        f.ident(&self.td.table_name);
        f.push(" SET ");
        for (index, (column, value)) in assignments.into_iter().enumerate() {
            if index > 0 {
                f.push(", ");
            }
            f.ident(&column);
            f.push(" = ");
            f.bind(value);
        }
        f.push(" WHERE ");
        f.ident(&self.td.unique_id_column);
        f.push(" = ");
        f.bind(id);

        Ok(())
    }

    /// Walks the descriptor's fields in declared order and keeps the ones
    /// whose wire key is present in the payload. Declaration order is the
    /// argument-ordering contract for Create/Update; the placeholders and
    /// the argument list are produced by this one traversal.
    ///
    /// Money fields expand into their amount and currency candidate
    /// columns, each tested independently inside the money object. A
    /// currency fixed by literal has no column to write.
    fn payload_columns(
        &self,
        payload: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Vec<(String, Value)>> {
        let mut assignments = Vec::new();

        for field in &self.td.fields {
            if field.is_relationship() {
                continue;
            }

            if field.is_money() {
                let Some(raw) = payload.get(&field.key) else {
                    continue;
                };
                let object = raw.as_object().ok_or_else(|| {
                    Error::bad_request(format!(
                        "money field '{}' must be an object",
                        field.key
                    ))
                })?;

                if let Some(amount) = field.ty.amount.as_ref() {
                    if let Some(value) = object.get(&amount.key) {
                        assignments.push((
                            amount.from_column.clone(),
                            coerce::json_to_value(FieldKind::Money, value)?,
                        ));
                    }
                }
                if let Some(currency) = field.ty.currency.as_ref() {
                    if let Some(column) = currency.from_column.as_deref() {
                        if let Some(value) = object.get(&currency.key) {
                            assignments.push((
                                column.to_string(),
                                coerce::json_to_value(FieldKind::Text, value)?,
                            ));
                        }
                    }
                }
            } else {
                let Some(column) = field.from_column.as_deref() else {
                    continue;
                };
                let Some(value) = payload.get(&field.key) else {
                    continue;
                };
                assignments.push((
                    column.to_string(),
                    coerce::json_to_value(field.ty.kind, value)?,
                ));
            }
        }

        if assignments.is_empty() {
            return Err(Error::bad_request("payload contains zero recognized columns"));
        }

        Ok(assignments)
    }
}
