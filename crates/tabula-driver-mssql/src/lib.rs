mod value;

use std::borrow::Cow;
use tabula_core::driver::{ColumnMeta, Dialect, ExecOutput, QueryOutput};
use tabula_core::{Error, Result};
use tabula_sql::DialectExt;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use url::Url;

/// SQL Server driver.
///
/// tiberius is async-only; each connection owns a current-thread tokio
/// runtime and blocks on it, which keeps the engine's thread-per-request
/// model intact (the blocking `postgres` client does the same internally).
pub struct Mssql {
    config: Config,
    url: String,
}

impl Mssql {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::backend)?;

        if url.scheme() != "mssql" {
            return Err(Error::bad_request(format!(
                "connection URL does not have a `mssql` scheme; url={url_str}"
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            Error::bad_request(format!("missing host in connection URL; url={url_str}"))
        })?;

        let mut config = Config::new();
        config.host(host);
        config.port(url.port().unwrap_or(1433));

        let database = url.path().trim_start_matches('/');
        if database.is_empty() {
            return Err(Error::bad_request(format!(
                "no database specified - missing path in connection URL; url={url_str}"
            )));
        }
        config.database(database);

        if !url.username().is_empty() {
            config.authentication(AuthMethod::sql_server(
                url.username(),
                url.password().unwrap_or(""),
            ));
        }
        config.trust_cert();

        Ok(Self {
            config,
            url: url_str,
        })
    }

    /// Initialize the driver from an ADO.NET connection string.
    pub fn from_ado_string(conn_str: &str) -> Result<Self> {
        let config = Config::from_ado_string(conn_str).map_err(Error::backend)?;
        Ok(Self {
            config,
            url: "mssql://".to_string(),
        })
    }
}

impl tabula_core::Driver for Mssql {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Mssql
    }

    fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::backend)?;

        let config = self.config.clone();
        let client = runtime.block_on(async move {
            let tcp = TcpStream::connect(config.get_addr())
                .await
                .map_err(Error::backend)?;
            tcp.set_nodelay(true).map_err(Error::backend)?;
            Client::connect(config, tcp.compat_write())
                .await
                .map_err(Error::backend)
        })?;

        Ok(Box::new(Connection { runtime, client }))
    }
}

pub struct Connection {
    runtime: Runtime,
    client: Client<Compat<TcpStream>>,
}

impl tabula_core::Connection for Connection {
    fn query(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<QueryOutput> {
        let Self { runtime, client } = self;

        let wrapped: Vec<value::Value> =
            params.iter().cloned().map(value::Value::from).collect();
        let refs: Vec<&dyn tiberius::ToSql> = wrapped
            .iter()
            .map(|param| param as &dyn tiberius::ToSql)
            .collect();

        runtime.block_on(async move {
            let mut stream = client.query(sql, &refs).await.map_err(Error::backend)?;

            let columns: Vec<ColumnMeta> = stream
                .columns()
                .await
                .map_err(Error::backend)?
                .map(|columns| {
                    columns
                        .iter()
                        .map(|column| ColumnMeta {
                            name: column.name().to_string(),
                            native_type: value::type_name(column.column_type()).to_string(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            let raw_rows = stream.into_first_result().await.map_err(Error::backend)?;

            let mut rows = Vec::with_capacity(raw_rows.len());
            for row in &raw_rows {
                rows.push(value::scan_row(row)?);
            }

            Ok(QueryOutput { columns, rows })
        })
    }

    fn execute(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<ExecOutput> {
        let Self { runtime, client } = self;

        let wrapped: Vec<value::Value> =
            params.iter().cloned().map(value::Value::from).collect();
        let refs: Vec<&dyn tiberius::ToSql> = wrapped
            .iter()
            .map(|param| param as &dyn tiberius::ToSql)
            .collect();

        runtime.block_on(async move {
            let result = client.execute(sql, &refs).await.map_err(Error::backend)?;

            // Generated ids travel through OUTPUT INSERTED, not through
            // the driver.
            Ok(ExecOutput {
                rows_affected: result.total(),
                last_insert_id: None,
            })
        })
    }

    fn begin(&mut self) -> Result<()> {
        self.run_statement(Dialect::Mssql.begin_statement())
    }

    fn commit(&mut self) -> Result<()> {
        self.run_statement("COMMIT TRANSACTION")
    }

    fn rollback(&mut self) -> Result<()> {
        self.run_statement("ROLLBACK TRANSACTION")
    }
}

impl Connection {
    fn run_statement(&mut self, sql: &str) -> Result<()> {
        let Self { runtime, client } = self;
        runtime.block_on(async move {
            client.execute(sql, &[]).await.map_err(Error::backend)?;
            Ok(())
        })
    }
}
