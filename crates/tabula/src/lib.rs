//! Descriptor-driven REST CRUD engine over an arbitrary relational
//! database.
//!
//! A [`Db`] is built from a database driver and a [`Descriptor`] document.
//! At startup it introspects every mapped table (base tables first, then
//! relationship joins), caches the resulting schema mappings, and then
//! serves the fixed operation set a REST CRUD + "options" surface needs.
//! HTTP dispatch, authentication, and configuration loading are external
//! collaborators; they construct a [`RequestScope`] per request and call
//! one operation on the shared `Db`.

mod catalog;
pub use catalog::Catalog;

mod db;
pub use db::{CreateOutcome, Db};

mod engine;

mod request;
pub use request::RequestScope;

mod txn;

pub use tabula_core::{
    coerce, descriptor, driver, schema, Descriptor, Dialect, Error, ErrorKind, Result, Value,
};
pub use tabula_sql::Filter;
