use tabula_core::driver::{Connection, Driver};
use tabula_core::{Error, Result};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

/// Tracks ad-hoc database transactions shared across otherwise-independent
/// requests.
///
/// The handle table is the only shared mutable state in the engine.
/// Create, commit, and timeout-eviction all race by design; the mutex makes
/// each one atomic, and holding it across a statement executed inside a
/// named transaction also serializes use of that transaction's connection.
#[derive(Clone)]
pub(crate) struct TransactionManager {
    inner: Arc<Mutex<HashMap<Uuid, OpenTx>>>,
}

struct OpenTx {
    conn: Box<dyn Connection>,
    deadline: Instant,
}

impl TransactionManager {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a database transaction on a fresh connection and hands back
    /// its uuid. A background timer evicts the transaction if it is still
    /// open when the timeout fires; eviction is silent, no client waits
    /// on it.
    pub(crate) fn begin(&self, driver: &dyn Driver, timeout: Duration) -> Result<Uuid> {
        let mut conn = driver.connect()?;
        conn.begin()?;

        let id = Uuid::new_v4();
        let deadline = Instant::now() + timeout;
        self.inner
            .lock()
            .unwrap()
            .insert(id, OpenTx { conn, deadline });
        debug!(%id, ?timeout, "transaction opened");

        let table = Arc::clone(&self.inner);
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            evict(&table, id);
        });

        Ok(id)
    }

    /// Commits and invalidates the handle. Absent handles — already
    /// committed, expired, or never created — are NotFound.
    pub(crate) fn commit(&self, id: Uuid) -> Result<()> {
        let mut tx = self
            .inner
            .lock()
            .unwrap()
            .remove(&id)
            .ok_or_else(|| Error::transaction_not_found(&id))?;
        debug!(%id, "transaction committed");
        tx.conn.commit()
    }

    /// Runs one statement on a named open transaction. The transaction is
    /// left open afterwards: only an explicit commit or deadline expiry
    /// ever finishes it.
    pub(crate) fn exec_in<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut dyn Connection) -> Result<T>,
    ) -> Result<T> {
        let mut table = self.inner.lock().unwrap();
        let tx = table
            .get_mut(&id)
            .ok_or_else(|| Error::transaction_not_found(&id))?;
        f(tx.conn.as_mut())
    }
}

fn evict(table: &Mutex<HashMap<Uuid, OpenTx>>, id: Uuid) {
    let tx = {
        let mut table = table.lock().unwrap();
        match table.get(&id) {
            Some(tx) if tx.deadline <= Instant::now() => table.remove(&id),
            _ => None,
        }
    };

    if let Some(mut tx) = tx {
        warn!(%id, "transaction expired, rolling back");
        if let Err(err) = tx.conn.rollback() {
            warn!(%id, %err, "rollback of expired transaction failed");
        }
    }
}
