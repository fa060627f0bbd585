use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tabula_core::driver::{Dialect, ExecOutput, QueryOutput};
use tabula_core::{Connection, Driver, Error, Result, Value};

/// A scripted driver for exercising dialect-specific engine behavior
/// against backends no test server exists for. Each query/execute pops the
/// next scripted response; the SQL actually issued is logged for
/// assertions.
pub struct StubDriver {
    dialect: Dialect,
    script: Arc<Mutex<VecDeque<StubResponse>>>,
    log: Arc<Mutex<Vec<String>>>,
}

pub enum StubResponse {
    Query(QueryOutput),
    Exec(ExecOutput),
}

impl StubDriver {
    pub fn new(dialect: Dialect, script: Vec<StubResponse>) -> Self {
        Self {
            dialect,
            script: Arc::new(Mutex::new(script.into())),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto the issued-SQL log; keep a clone before handing the
    /// driver to the engine.
    pub fn log_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }
}

impl Driver for StubDriver {
    fn url(&self) -> Cow<'_, str> {
        Cow::Borrowed("stub://")
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(StubConnection {
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
        }))
    }
}

struct StubConnection {
    script: Arc<Mutex<VecDeque<StubResponse>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl StubConnection {
    fn next(&self, sql: &str) -> Result<StubResponse> {
        self.log.lock().unwrap().push(sql.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::backend_msg(format!("stub script exhausted at: {sql}")))
    }
}

impl Connection for StubConnection {
    fn query(&mut self, sql: &str, _params: &[Value]) -> Result<QueryOutput> {
        match self.next(sql)? {
            StubResponse::Query(output) => Ok(output),
            StubResponse::Exec(_) => Err(Error::backend_msg(format!(
                "stub script expected an execute at: {sql}"
            ))),
        }
    }

    fn execute(&mut self, sql: &str, _params: &[Value]) -> Result<ExecOutput> {
        match self.next(sql)? {
            StubResponse::Exec(output) => Ok(output),
            StubResponse::Query(_) => Err(Error::backend_msg(format!(
                "stub script expected a query at: {sql}"
            ))),
        }
    }

    fn begin(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("BEGIN".to_string());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("COMMIT".to_string());
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.log.lock().unwrap().push("ROLLBACK".to_string());
        Ok(())
    }
}
