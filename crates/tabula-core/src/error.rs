use std::fmt;

/// An error that can occur while loading a descriptor, introspecting a
/// schema, or serving a request.
///
/// Each error carries a [`ErrorKind`] that determines how the boundary maps
/// it onto the wire: startup kinds abort the process, request kinds map to
/// an HTTP-equivalent status code and a small JSON envelope.
pub struct Error {
    kind: ErrorKind,
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The descriptor document is not structurally valid JSON.
    Parse,

    /// The descriptor parsed but contradicts itself.
    Validation,

    /// Schema introspection returned no usable column metadata.
    Schema,

    /// A template could not be rendered from descriptor-derived input.
    Template,

    /// Unknown resource id or transaction handle.
    NotFound,

    /// The request payload or query string is unusable.
    BadRequest,

    /// The database driver failed.
    Backend,

    /// The driver cannot provide the requested capability.
    Unsupported,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn parse(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            kind: ErrorKind::Parse,
            message: format!("invalid descriptor document: {cause}"),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Template, message)
    }

    /// A resource lookup by unique id matched no rows.
    pub fn resource_not_found(id: &str, table: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("Resource with uniqueID '{id}' not found in {table} table"),
        )
    }

    /// The resource key in the request path is not declared by the descriptor.
    pub fn unknown_resource(key: &str) -> Self {
        Self::new(ErrorKind::NotFound, format!("Unknown resource '{key}'"))
    }

    /// The named transaction is absent: committed, expired, or never created.
    pub fn transaction_not_found(id: &uuid::Uuid) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("Transaction with uuid '{id}' not found"),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn backend(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            kind: ErrorKind::Backend,
            message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn backend_msg(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Backend, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP-equivalent status code the boundary responds with.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::NotFound => 404,
            ErrorKind::BadRequest => 400,
            _ => 500,
        }
    }

    /// The `{"status":{"code":N,"description":"..."}}` envelope the boundary
    /// serializes request-scoped errors into.
    pub fn to_envelope(&self) -> serde_json::Value {
        serde_json::json!({
            "status": {
                "code": self.status_code(),
                "description": self.message,
            }
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn not_found_envelope_matches_wire_contract() {
        let err = Error::resource_not_found("42", "equipment");
        assert_eq!(err.status_code(), 404);
        assert_eq!(
            err.to_envelope(),
            serde_json::json!({
                "status": {
                    "code": 404,
                    "description": "Resource with uniqueID '42' not found in equipment table",
                }
            })
        );
    }

    #[test]
    fn startup_kinds_map_to_500() {
        assert_eq!(Error::validation("x").status_code(), 500);
        assert_eq!(Error::schema("x").status_code(), 500);
        assert_eq!(Error::template("x").status_code(), 500);
    }
}
