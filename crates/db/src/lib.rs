pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_config, connect_with_settings, DbPool};
pub use fixtures::{demo_conditions, seed_demo_conditions, SeedResult};
pub use repositories::{
    InMemoryConditionRepository, InMemoryCostCatalog, InMemoryResultLog, RepositoryError,
    SqlConditionRepository, SqlResultLog,
};
