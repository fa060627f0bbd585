pub mod coerce;

pub mod descriptor;
pub use descriptor::Descriptor;

mod error;
pub use error::{Error, ErrorKind};

pub mod driver;
pub use driver::{Connection, Dialect, Driver};

pub mod schema;
pub use schema::{ScanType, SchemaMapping};

mod value;
pub use value::Value;

pub type Result<T> = std::result::Result<T, Error>;
