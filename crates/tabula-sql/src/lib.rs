mod dialect;
pub use dialect::{DialectExt, InsertIdStrategy};

mod filter;
pub use filter::Filter;

mod render;
pub use render::{Operation, Rendered, Renderer};

pub use tabula_core::Dialect;
