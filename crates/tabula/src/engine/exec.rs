//! Operation execution: renders, runs, and formats each logical operation,
//! including the private-transaction wrapping of mutations.

use super::wire;

use crate::db::{CreateOutcome, Db};
use crate::request::RequestScope;

use tabula_core::descriptor::TypeDescriptor;
use tabula_core::driver::Connection;
use tabula_core::{coerce, Error, ErrorKind, Result, Value};
use tabula_sql::{DialectExt, InsertIdStrategy, Operation};

use tracing::{debug, warn};

pub(crate) fn get_single(db: &Db, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
    let td = scope.type_descriptor();
    if !td.fetch_one_available {
        return Err(Error::unknown_resource(&td.key));
    }

    let mut conn = db.connect()?;
    fetch_single(db, td, scope.id()?, conn.as_mut())
}

pub(crate) fn get_collection(db: &Db, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
    let td = scope.type_descriptor();
    let mapping = db.catalog.mapping(&td.table_name, td.has_relationships())?;

    let rendered = match scope.filter() {
        Some(filter) => {
            let scan = db
                .catalog
                .scan_type(&td.table_name, &filter.column)
                .ok_or_else(|| {
                    Error::bad_request(format!("unknown filter column '{}'", filter.column))
                })?;
            db.renderer(td).render(Operation::GetCollectionFiltered {
                column: &filter.column,
                value: coerce::string_to_value(scan, &filter.value)?,
            })?
        }
        None => db.renderer(td).render(Operation::GetCollection)?,
    };
    debug!(sql = %rendered.sql, "get collection");

    let mut conn = db.connect()?;
    let output = conn.query(&rendered.sql, &rendered.params)?;
    let objects = wire::format_rows(&db.descriptor, td, mapping, &output.rows)?;
    Ok(serde_json::Value::Array(objects))
}

pub(crate) fn get_options(db: &Db, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
    let td = scope.type_descriptor();
    if !td.options_available {
        return Err(Error::unknown_resource(&td.key));
    }

    let rendered = match scope.option_filter() {
        Some(pattern) => db
            .renderer(td)
            .render(Operation::GetCollectionAsOptionsFiltered { pattern })?,
        None => db.renderer(td).render(Operation::GetCollectionAsOptions)?,
    };
    debug!(sql = %rendered.sql, "get options");

    let mut conn = db.connect()?;
    let output = conn.query(&rendered.sql, &rendered.params)?;

    // Protocol quirk, kept for compatibility: an empty option collection
    // serializes as a one-element array holding an empty object.
    if output.rows.is_empty() {
        return Ok(serde_json::json!([{}]));
    }

    let options = output.rows.iter().map(|row| option_object(row)).collect();
    Ok(serde_json::Value::Array(options))
}

pub(crate) fn get_option_single(db: &Db, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
    let td = scope.type_descriptor();
    if !td.options_available {
        return Err(Error::unknown_resource(&td.key));
    }

    let id = scope.id()?;
    let rendered = db.renderer(td).render(Operation::GetSingleAsOption {
        id: coerce_id(db, td, id)?,
    })?;
    debug!(sql = %rendered.sql, "get option");

    let mut conn = db.connect()?;
    let output = conn.query(&rendered.sql, &rendered.params)?;
    match output.rows.first() {
        Some(row) => Ok(option_object(row)),
        None => Err(Error::resource_not_found(id, &td.table_name)),
    }
}

pub(crate) fn create(db: &Db, scope: &RequestScope<'_>) -> Result<CreateOutcome> {
    let td = scope.type_descriptor();
    let payload = scope.payload()?;

    match scope.transaction() {
        Some(tx) => db.txns.exec_in(tx, |conn| create_on(db, td, payload, conn)),
        None => {
            let mut conn = db.connect()?;
            in_private_txn(conn.as_mut(), |conn| create_on(db, td, payload, conn))
        }
    }
}

pub(crate) fn update(db: &Db, scope: &RequestScope<'_>) -> Result<serde_json::Value> {
    let td = scope.type_descriptor();
    let payload = scope.payload()?;
    let id = scope.id()?;

    match scope.transaction() {
        Some(tx) => db.txns.exec_in(tx, |conn| update_on(db, td, id, payload, conn)),
        None => {
            let mut conn = db.connect()?;
            in_private_txn(conn.as_mut(), |conn| update_on(db, td, id, payload, conn))
        }
    }
}

pub(crate) fn delete(db: &Db, scope: &RequestScope<'_>) -> Result<()> {
    let td = scope.type_descriptor();
    let id = scope.id()?;

    match scope.transaction() {
        Some(tx) => db.txns.exec_in(tx, |conn| delete_on(db, td, id, conn)),
        None => {
            let mut conn = db.connect()?;
            in_private_txn(conn.as_mut(), |conn| delete_on(db, td, id, conn))
        }
    }
}

/// Fetches and formats one resource by id on an already-open connection,
/// so a mutation inside a named transaction can read back its own
/// uncommitted row.
pub(crate) fn fetch_single(
    db: &Db,
    td: &TypeDescriptor,
    id: &str,
    conn: &mut dyn Connection,
) -> Result<serde_json::Value> {
    let mapping = db.catalog.mapping(&td.table_name, td.has_relationships())?;
    let rendered = db.renderer(td).render(Operation::GetSingle {
        id: coerce_id(db, td, id)?,
    })?;
    debug!(sql = %rendered.sql, "get single");

    let output = conn.query(&rendered.sql, &rendered.params)?;
    if output.rows.is_empty() {
        return Err(Error::resource_not_found(id, &td.table_name));
    }

    let objects = wire::format_rows(&db.descriptor, td, mapping, &output.rows)?;
    objects
        .into_iter()
        .next()
        .ok_or_else(|| Error::resource_not_found(id, &td.table_name))
}

fn create_on(
    db: &Db,
    td: &TypeDescriptor,
    payload: &serde_json::Map<String, serde_json::Value>,
    conn: &mut dyn Connection,
) -> Result<CreateOutcome> {
    let rendered = db
        .renderer(td)
        .render(Operation::CreateSingle { payload })?;
    debug!(sql = %rendered.sql, "create single");

    // An unreported id is not a failure: the row is inserted either way,
    // and the boundary answers 204 instead of 201.
    let id = match insert_reporting_id(db, &rendered, conn) {
        Ok(id) => id,
        Err(err) if err.kind() == ErrorKind::Unsupported => {
            return Ok(CreateOutcome::NoContent)
        }
        Err(err) => return Err(err),
    };

    let body = fetch_single(db, td, &id, conn)?;
    Ok(CreateOutcome::Created { id, body })
}

/// Runs the insert and retrieves the generated id by whatever strategy the
/// dialect supports. Dialects that cannot report one still insert, then
/// fail with the Unsupported kind.
fn insert_reporting_id(
    db: &Db,
    rendered: &tabula_sql::Rendered,
    conn: &mut dyn Connection,
) -> Result<String> {
    match db.dialect.insert_id() {
        InsertIdStrategy::Driver => {
            let output = conn.execute(&rendered.sql, &rendered.params)?;
            output
                .last_insert_id
                .map(|id| id.to_string())
                .ok_or_else(|| Error::unsupported("driver did not report the generated id"))
        }
        InsertIdStrategy::Returning => {
            let output = conn.query(&rendered.sql, &rendered.params)?;
            output
                .rows
                .first()
                .and_then(|row| row.first())
                .map(|id| id.to_wire_string())
                .ok_or_else(|| Error::backend_msg("insert did not return the generated id"))
        }
        InsertIdStrategy::Unsupported => {
            conn.execute(&rendered.sql, &rendered.params)?;
            Err(Error::unsupported(
                "dialect cannot report generated insert ids",
            ))
        }
    }
}

fn update_on(
    db: &Db,
    td: &TypeDescriptor,
    id: &str,
    payload: &serde_json::Map<String, serde_json::Value>,
    conn: &mut dyn Connection,
) -> Result<serde_json::Value> {
    let rendered = db.renderer(td).render(Operation::UpdateSingle {
        id: coerce_id(db, td, id)?,
        payload,
    })?;
    debug!(sql = %rendered.sql, "update single");

    let output = conn.execute(&rendered.sql, &rendered.params)?;
    if output.rows_affected == 0 {
        return Err(Error::resource_not_found(id, &td.table_name));
    }

    fetch_single(db, td, id, conn)
}

fn delete_on(db: &Db, td: &TypeDescriptor, id: &str, conn: &mut dyn Connection) -> Result<()> {
    let rendered = db.renderer(td).render(Operation::DeleteSingle {
        id: coerce_id(db, td, id)?,
    })?;
    debug!(sql = %rendered.sql, "delete single");

    let output = conn.execute(&rendered.sql, &rendered.params)?;
    if output.rows_affected == 0 {
        return Err(Error::resource_not_found(id, &td.table_name));
    }
    Ok(())
}

/// Wraps a mutation that named no transaction in a private one: commit on
/// success, rollback on any error, so this path never leaves a transaction
/// dangling.
fn in_private_txn<T>(
    conn: &mut dyn Connection,
    f: impl FnOnce(&mut dyn Connection) -> Result<T>,
) -> Result<T> {
    conn.begin()?;
    match f(conn) {
        Ok(value) => {
            conn.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = conn.rollback() {
                warn!(%rollback_err, "rollback after failed mutation also failed");
            }
            Err(err)
        }
    }
}

fn coerce_id(db: &Db, td: &TypeDescriptor, id: &str) -> Result<Value> {
    let scan = db
        .catalog
        .scan_type(&td.table_name, &td.unique_id_column)
        .unwrap_or_default();
    coerce::string_to_value(scan, id)
}

/// `{id, name}`, with the id always a string on the wire.
fn option_object(row: &[Value]) -> serde_json::Value {
    let id = row.first().map(|v| wire::scalar(v, true));
    let name = row.get(1).map(|v| wire::scalar(v, false));
    serde_json::json!({
        "id": id.unwrap_or(serde_json::Value::Null),
        "name": name.unwrap_or(serde_json::Value::Null),
    })
}
