use tabula_core::{Error, Result};

/// A parsed `?filter=` expression: `<column> eq <value>`.
///
/// `eq` is the only supported predicate. The value may contain spaces; the
/// query string is URL-decoded upstream by the routing collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.splitn(3, ' ');

        let (Some(column), Some(predicate), Some(value)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::bad_request(format!(
                "malformed filter expression '{raw}'"
            )));
        };

        if predicate != "eq" {
            return Err(Error::bad_request(format!(
                "unsupported filter predicate '{predicate}'"
            )));
        }
        if column.is_empty() || value.is_empty() {
            return Err(Error::bad_request(format!(
                "malformed filter expression '{raw}'"
            )));
        }

        Ok(Self {
            column: column.to_string(),
            value: value.to_string(),
        })
    }
}
