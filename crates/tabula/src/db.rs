use crate::catalog::Catalog;
use crate::engine::exec;
use crate::request::RequestScope;
use crate::txn::TransactionManager;

use tabula_core::descriptor::TypeDescriptor;
use tabula_core::driver::{Connection, Driver};
use tabula_core::{Descriptor, Dialect, Result};
use tabula_sql::Renderer;

use std::time::Duration;

use tracing::info;
use uuid::Uuid;

/// The engine: one database driver, one dialect, one descriptor, and the
/// schema catalog built from them.
///
/// `Db` is shared across request worker threads. Everything except the
/// transaction handle table is immutable after construction.
pub struct Db {
    pub(crate) driver: Box<dyn Driver>,
    pub(crate) dialect: Dialect,
    pub(crate) descriptor: Descriptor,
    pub(crate) catalog: Catalog,
    pub(crate) txns: TransactionManager,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("url", &self.driver.url())
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// What a Create produced: the created resource, or nothing when the
/// dialect cannot report generated ids (the boundary answers 204 instead
/// of 201 in that case).
#[derive(Debug)]
pub enum CreateOutcome {
    Created { id: String, body: serde_json::Value },
    NoContent,
}

impl Db {
    /// Builds the engine: connects, introspects every mapped table (base
    /// tables first, then relationship joins), and caches the result.
    /// Fails — and the process must not serve — on any descriptor or
    /// introspection problem.
    pub fn new(driver: impl Driver, descriptor: Descriptor) -> Result<Self> {
        let driver: Box<dyn Driver> = Box::new(driver);
        let dialect = driver.dialect();

        let mut conn = driver.connect()?;
        let catalog = Catalog::build(&descriptor, dialect, conn.as_mut())?;
        info!(url = %driver.url(), ?dialect, "engine ready");

        Ok(Self {
            driver,
            dialect,
            descriptor,
            catalog,
            txns: TransactionManager::new(),
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Raw descriptor document, served at `GET /`.
    pub fn descriptor_json(&self) -> &serde_json::Value {
        self.descriptor.to_json()
    }

    /// Starts building the scope for one request.
    pub fn scope(&self, resource: &str) -> Result<RequestScope<'_>> {
        RequestScope::new(&self.descriptor, resource)
    }

    /// `GET /{table}/{id}`
    pub fn get_single(&self, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
        exec::get_single(self, scope)
    }

    /// `GET /{table}`, optionally `?filter=<column> eq <value>`
    pub fn get_collection(&self, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
        exec::get_collection(self, scope)
    }

    /// `GET /{table}/options`, optionally `?filter=`
    pub fn get_options(&self, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
        exec::get_options(self, scope)
    }

    /// `GET /{table}/options/{id}`
    pub fn get_option_single(&self, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
        exec::get_option_single(self, scope)
    }

    /// `POST /{table}`, optionally `?tx={uuid}`
    pub fn create(&self, scope: &RequestScope<'_>) -> Result<CreateOutcome> {
        exec::create(self, scope)
    }

    /// `PATCH /{table}/{id}`, optionally `?tx={uuid}`
    pub fn update(&self, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
        exec::update(self, scope)
    }

    /// `DELETE /{table}/{id}`, optionally `?tx={uuid}`
    pub fn delete(&self, scope: &RequestScope<'_>) -> Result<()> {
        exec::delete(self, scope)
    }

    /// `POST /?begin=true`
    pub fn begin_transaction(&self, timeout: Duration) -> Result<Uuid> {
        self.txns.begin(self.driver.as_ref(), timeout)
    }

    /// `POST /?commit={uuid}`
    pub fn commit_transaction(&self, tx: Uuid) -> Result<()> {
        self.txns.commit(tx)
    }

    pub(crate) fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect()
    }

    pub(crate) fn renderer<'a>(&'a self, td: &'a TypeDescriptor) -> Renderer<'a> {
        Renderer::new(self.dialect, &self.descriptor, td)
    }
}
