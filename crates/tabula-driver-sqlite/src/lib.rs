mod value;
pub(crate) use value::Value;

use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use tabula_core::driver::{ColumnMeta, Dialect, ExecOutput, QueryOutput};
use tabula_core::{Error, Result};
use tabula_sql::DialectExt;
use url::Url;

/// SQLite driver.
///
/// An in-memory database lives and dies with a single connection, and the
/// engine checks out one connection per request; use a file path for
/// anything beyond a one-shot probe.
#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::backend)?;

        if url.scheme() != "sqlite" {
            return Err(Error::bad_request(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl tabula_core::Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory(),
        };
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Self {
        let connection = RusqliteConnection::open_in_memory().unwrap();

        Self { connection }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::backend)?;
        Ok(Self { connection })
    }
}

impl tabula_core::Connection for Connection {
    fn query(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<QueryOutput> {
        let mut stmt = self.connection.prepare(sql).map_err(Error::backend)?;

        // Metadata is available before any row is fetched, so introspecting
        // an empty table still yields its columns.
        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|column| ColumnMeta {
                name: column.name().to_string(),
                native_type: column.decl_type().unwrap_or("").to_string(),
            })
            .collect();

        let params: Vec<Value> = params.iter().cloned().map(Value::from).collect();
        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(Error::backend)?;

        let mut out = Vec::new();
        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(columns.len());
                    for index in 0..columns.len() {
                        items.push(Value::from_sql(row, index)?.into_inner());
                    }
                    out.push(items);
                }
                Ok(None) => break,
                Err(err) => return Err(Error::backend(err)),
            }
        }

        Ok(QueryOutput { columns, rows: out })
    }

    fn execute(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<ExecOutput> {
        let params: Vec<Value> = params.iter().cloned().map(Value::from).collect();
        let count = self
            .connection
            .execute(sql, rusqlite::params_from_iter(params.iter()))
            .map_err(Error::backend)?;

        Ok(ExecOutput {
            rows_affected: count as u64,
            last_insert_id: Some(self.connection.last_insert_rowid()),
        })
    }

    fn begin(&mut self) -> Result<()> {
        self.connection
            .execute_batch(Dialect::Sqlite.begin_statement())
            .map_err(Error::backend)
    }

    fn commit(&mut self) -> Result<()> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(Error::backend)
    }

    fn rollback(&mut self) -> Result<()> {
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(Error::backend)
    }
}
