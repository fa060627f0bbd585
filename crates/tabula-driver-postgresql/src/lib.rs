mod value;
pub(crate) use value::Value;

use postgres::{Client, Config, NoTls};
use std::borrow::Cow;
use tabula_core::driver::{ColumnMeta, Dialect, ExecOutput, QueryOutput};
use tabula_core::{Error, Result};
use tabula_sql::DialectExt;
use url::Url;

/// PostgreSQL driver over the blocking `postgres` client.
#[derive(Debug)]
pub struct PostgreSQL {
    config: Config,
    url: String,
}

impl PostgreSQL {
    /// Connects to a PostgreSQL database using a connection string.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::backend)?;

        if url.scheme() != "postgresql" {
            return Err(Error::bad_request(format!(
                "connection URL does not have a `postgresql` scheme; url={url_str}"
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            Error::bad_request(format!("missing host in connection URL; url={url_str}"))
        })?;

        if url.path().is_empty() {
            return Err(Error::bad_request(format!(
                "no database specified - missing path in connection URL; url={url_str}"
            )));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(url.path().trim_start_matches('/'));

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        Ok(Self {
            config,
            url: url_str,
        })
    }

    /// Initialize the driver from an already-built [`postgres::Config`].
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            url: "postgresql://".to_string(),
        }
    }
}

impl tabula_core::Driver for PostgreSQL {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
    }

    fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let client = self.config.connect(NoTls).map_err(Error::backend)?;
        Ok(Box::new(Connection { client }))
    }
}

pub struct Connection {
    client: Client,
}

impl tabula_core::Connection for Connection {
    fn query(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<QueryOutput> {
        // Preparing first makes column metadata available even when the
        // statement matches zero rows.
        let stmt = self.client.prepare(sql).map_err(Error::backend)?;

        let columns: Vec<ColumnMeta> = stmt
            .columns()
            .iter()
            .map(|column| ColumnMeta {
                name: column.name().to_string(),
                native_type: column.type_().name().to_string(),
            })
            .collect();

        let params: Vec<Value> = params.iter().cloned().map(Value::from).collect();
        let refs: Vec<&(dyn postgres::types::ToSql + Sync)> = params
            .iter()
            .map(|param| param as &(dyn postgres::types::ToSql + Sync))
            .collect();

        let rows = self.client.query(&stmt, &refs).map_err(Error::backend)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut items = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                items.push(value::scan(row, index)?);
            }
            out.push(items);
        }

        Ok(QueryOutput { columns, rows: out })
    }

    fn execute(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<ExecOutput> {
        let params: Vec<Value> = params.iter().cloned().map(Value::from).collect();
        let refs: Vec<&(dyn postgres::types::ToSql + Sync)> = params
            .iter()
            .map(|param| param as &(dyn postgres::types::ToSql + Sync))
            .collect();

        let count = self.client.execute(sql, &refs).map_err(Error::backend)?;

        // Generated ids travel through RETURNING, not through the driver.
        Ok(ExecOutput {
            rows_affected: count,
            last_insert_id: None,
        })
    }

    fn begin(&mut self) -> Result<()> {
        self.client
            .batch_execute(Dialect::Postgresql.begin_statement())
            .map_err(Error::backend)
    }

    fn commit(&mut self) -> Result<()> {
        self.client.batch_execute("COMMIT").map_err(Error::backend)
    }

    fn rollback(&mut self) -> Result<()> {
        self.client
            .batch_execute("ROLLBACK")
            .map_err(Error::backend)
    }
}
