use tabula_core::descriptor::TypeDescriptor;
use tabula_core::{Descriptor, Error, Result};
use tabula_sql::Filter;

use uuid::Uuid;

/// Everything the boundary resolved about one request, built once and
/// passed by parameter through every call. There is no request-scoped
/// key/value bag; a missing piece of context is a missing field here and
/// fails to compile.
#[derive(Debug)]
pub struct RequestScope<'a> {
    td: &'a TypeDescriptor,

    id: Option<String>,

    /// `?filter=<column> eq <value>` on collection routes.
    filter: Option<Filter>,

    /// `?filter=` pattern on option routes.
    option_filter: Option<String>,

    /// `?tx=` on mutating routes: join an already-open transaction.
    tx: Option<Uuid>,

    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

impl<'a> RequestScope<'a> {
    /// Resolves the resource key from the request path. Unknown keys are
    /// NotFound: the route space is exactly the descriptor's key space.
    pub fn new(descriptor: &'a Descriptor, resource: &str) -> Result<Self> {
        let td = descriptor
            .type_descriptor(resource)
            .ok_or_else(|| Error::unknown_resource(resource))?;

        Ok(Self {
            td,
            id: None,
            filter: None,
            option_filter: None,
            tx: None,
            payload: None,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_option_filter(mut self, pattern: impl Into<String>) -> Self {
        self.option_filter = Some(pattern.into());
        self
    }

    pub fn with_transaction(mut self, tx: Uuid) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Attaches the request body. Anything but a JSON object is unusable
    /// for Create/Update.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Result<Self> {
        match payload {
            serde_json::Value::Object(map) => {
                self.payload = Some(map);
                Ok(self)
            }
            other => Err(Error::bad_request(format!(
                "request body must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn type_descriptor(&self) -> &'a TypeDescriptor {
        self.td
    }

    pub fn id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .ok_or_else(|| Error::bad_request("missing resource id"))
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn option_filter(&self) -> Option<&str> {
        self.option_filter.as_deref()
    }

    pub fn transaction(&self) -> Option<Uuid> {
        self.tx
    }

    pub fn payload(&self) -> Result<&serde_json::Map<String, serde_json::Value>> {
        self.payload
            .as_ref()
            .ok_or_else(|| Error::bad_request("missing request body"))
    }
}
