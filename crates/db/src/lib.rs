pub mod catalog;
pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use catalog::{ingest, load_snapshot};
pub use connection::{connect_with_config, connect_with_settings, DbPool};
pub use fixtures::demo_records;
pub use repositories::{
    InMemoryVariantRepository, RepositoryError, SqlVariantRepository, VariantRepository,
};
