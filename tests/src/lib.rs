mod setup;
pub use setup::{brewery_descriptor, seeded_sqlite, SqliteTest};

mod stub_driver;
pub use stub_driver::{StubDriver, StubResponse};
