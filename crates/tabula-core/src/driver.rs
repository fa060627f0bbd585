//! The blocking capability surface a database backend exposes to the
//! engine. One [`Driver`] produces [`Connection`]s; the engine checks one
//! out per request, and the transaction manager holds one per open
//! transaction.

use crate::{Result, Value};

use std::borrow::Cow;

/// The SQL dialect a driver speaks.
///
/// This is only the tag; placeholder syntax, native-type classification,
/// insert-id strategy, and the query template set hang off it in the SQL
/// crate. Exactly one dialect is injected into a running engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
    Mssql,
    Oracle,
}

/// A database backend: connection factory plus dialect identification.
pub trait Driver: Send + Sync + 'static {
    /// Connection URL for diagnostics.
    fn url(&self) -> Cow<'_, str>;

    fn dialect(&self) -> Dialect;

    /// Opens a new connection. Called once per request without a named
    /// transaction, and once per created transaction.
    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// One live database connection.
///
/// All calls block; concurrency comes from the caller's thread-per-request
/// model, not from the driver.
pub trait Connection: Send {
    /// Executes a statement that yields rows. Column metadata must be
    /// populated even when zero rows come back; schema introspection
    /// relies on it.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryOutput>;

    /// Executes a statement that yields no rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecOutput>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

/// Column metadata reported by the driver alongside a result set.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,

    /// The backend's name for the column's type, fed to the dialect's
    /// classifier. Drivers that only report a type code translate it to a
    /// canonical name first.
    pub native_type: String,
}

/// Rows plus their metadata, scanned into [`Value`]s.
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Value>>,
}

/// Outcome of a row-less statement.
#[derive(Debug, Default)]
pub struct ExecOutput {
    pub rows_affected: u64,

    /// The generated id, for drivers that report it directly.
    pub last_insert_id: Option<i64>,
}
