//! Per-dialect syntax and behavior differences, hung off the
//! [`Dialect`] tag as an extension trait so the engine can hold exactly one
//! injected dialect without a trait-object hierarchy.

mod mssql;
mod mysql;
mod oracle;
mod postgresql;
mod sqlite;

use tabula_core::{Dialect, ScanType};

use std::fmt::Write;

/// How a dialect retrieves the generated id after `CreateSingle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertIdStrategy {
    /// The driver reports the generated id directly.
    Driver,

    /// The insert statement carries a `RETURNING`/`OUTPUT` clause and the
    /// id is scanned back as a scalar.
    Returning,

    /// The backend cannot report the id; Create degrades to the no-body
    /// outcome.
    Unsupported,
}

pub trait DialectExt {
    /// Writes the 1-based positional placeholder for a parameter.
    fn write_placeholder(&self, dst: &mut String, index: usize);

    /// Writes a quoted identifier.
    fn write_ident(&self, dst: &mut String, name: &str);

    /// Wraps an already-written placeholder when the bound value is a
    /// date/datetime/time. Applied after positional assignment; most
    /// dialects pass the placeholder through untouched.
    fn temporal_placeholder(&self, placeholder: String) -> String;

    /// Folds a backend native type name into a scan type family.
    /// Names no family claims default to nullable text.
    fn classify(&self, native_type: &str) -> ScanType;

    fn insert_id(&self) -> InsertIdStrategy;

    /// The statement that opens an explicit transaction.
    fn begin_statement(&self) -> &'static str;
}

impl DialectExt for Dialect {
    fn write_placeholder(&self, dst: &mut String, index: usize) {
        match self {
            Dialect::Sqlite => write!(dst, "?{index}").unwrap(),
            Dialect::Mysql => dst.push('?'),
            Dialect::Postgresql => write!(dst, "${index}").unwrap(),
            Dialect::Mssql => write!(dst, "@p{index}").unwrap(),
            Dialect::Oracle => write!(dst, ":{index}").unwrap(),
        }
    }

    fn write_ident(&self, dst: &mut String, name: &str) {
        match self {
            Dialect::Mysql => {
                dst.push('`');
                dst.push_str(name);
                dst.push('`');
            }
            Dialect::Mssql => {
                dst.push('[');
                dst.push_str(name);
                dst.push(']');
            }
            Dialect::Sqlite | Dialect::Postgresql | Dialect::Oracle => {
                dst.push('"');
                dst.push_str(name);
                dst.push('"');
            }
        }
    }

    fn temporal_placeholder(&self, placeholder: String) -> String {
        match self {
            Dialect::Oracle => format!(
                "to_timestamp_tz({placeholder}, 'YYYY-MM-DD\"T\"HH24:MI:SS.FF3TZR')"
            ),
            _ => placeholder,
        }
    }

    fn classify(&self, native_type: &str) -> ScanType {
        match self {
            Dialect::Sqlite => sqlite::classify(native_type),
            Dialect::Postgresql => postgresql::classify(native_type),
            Dialect::Mysql => mysql::classify(native_type),
            Dialect::Mssql => mssql::classify(native_type),
            Dialect::Oracle => oracle::classify(native_type),
        }
    }

    fn insert_id(&self) -> InsertIdStrategy {
        match self {
            Dialect::Sqlite | Dialect::Mysql => InsertIdStrategy::Driver,
            Dialect::Postgresql | Dialect::Mssql => InsertIdStrategy::Returning,
            Dialect::Oracle => InsertIdStrategy::Unsupported,
        }
    }

    fn begin_statement(&self) -> &'static str {
        match self {
            Dialect::Sqlite | Dialect::Postgresql => "BEGIN",
            Dialect::Mysql => "START TRANSACTION",
            Dialect::Mssql => "BEGIN TRANSACTION",
            Dialect::Oracle => "SET TRANSACTION READ WRITE",
        }
    }
}
