mod value;

use mysql::prelude::Queryable;
use mysql::{Pool, PooledConn};
use std::borrow::Cow;
use tabula_core::driver::{ColumnMeta, Dialect, ExecOutput, QueryOutput};
use tabula_core::{Error, Result};
use tabula_sql::DialectExt;
use url::Url;

/// MySQL driver over the blocking `mysql` client.
#[derive(Debug)]
pub struct MySql {
    pool: Pool,
    url: String,
}

impl MySql {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::backend)?;

        if url.scheme() != "mysql" {
            return Err(Error::bad_request(format!(
                "connection url does not have a `mysql` scheme; url={url_str}"
            )));
        }

        url.host_str().ok_or_else(|| {
            Error::bad_request(format!("missing host in connection URL; url={url_str}"))
        })?;

        if url.path().is_empty() {
            return Err(Error::bad_request(format!(
                "no database specified - missing path in connection URL; url={url_str}"
            )));
        }

        let opts = mysql::Opts::from_url(url.as_ref()).map_err(Error::backend)?;
        // Report matched rows, not changed rows, so an update that writes
        // identical values still counts as touching the resource.
        let opts = mysql::OptsBuilder::from_opts(opts)
            .additional_capabilities(mysql::consts::CapabilityFlags::CLIENT_FOUND_ROWS);

        let pool = Pool::new(opts).map_err(Error::backend)?;
        Ok(Self { pool, url: url_str })
    }
}

impl tabula_core::Driver for MySql {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.url)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let conn = self.pool.get_conn().map_err(Error::backend)?;
        Ok(Box::new(Connection { conn }))
    }
}

pub struct Connection {
    conn: PooledConn,
}

impl tabula_core::Connection for Connection {
    fn query(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<QueryOutput> {
        let params = value::to_params(params);
        let mut result = self.conn.exec_iter(sql, params).map_err(Error::backend)?;

        let columns: Vec<ColumnMeta> = result
            .columns()
            .as_ref()
            .iter()
            .map(|column| ColumnMeta {
                name: column.name_str().into_owned(),
                native_type: value::type_name(column.column_type()).to_string(),
            })
            .collect();

        let mut rows = Vec::new();
        for row in result.by_ref() {
            let row = row.map_err(Error::backend)?;
            rows.push(value::scan_row(row));
        }

        Ok(QueryOutput { columns, rows })
    }

    fn execute(
        &mut self,
        sql: &str,
        params: &[tabula_core::Value],
    ) -> Result<ExecOutput> {
        let params = value::to_params(params);
        let result = self.conn.exec_iter(sql, params).map_err(Error::backend)?;

        Ok(ExecOutput {
            rows_affected: result.affected_rows(),
            last_insert_id: result.last_insert_id().map(|id| id as i64),
        })
    }

    fn begin(&mut self) -> Result<()> {
        self.conn
            .query_drop(Dialect::Mysql.begin_statement())
            .map_err(Error::backend)
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.query_drop("COMMIT").map_err(Error::backend)
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.query_drop("ROLLBACK").map_err(Error::backend)
    }
}
