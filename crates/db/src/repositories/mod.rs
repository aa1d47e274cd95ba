use chrono::{DateTime, Utc};
use thiserror::Error;

use pricefall_core::StoreError;

pub mod condition;
pub mod memory;
pub mod result_log;

pub use condition::SqlConditionRepository;
pub use memory::{InMemoryConditionRepository, InMemoryCostCatalog, InMemoryResultLog};
pub use result_log::SqlResultLog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => Self::Unavailable(error.to_string()),
            RepositoryError::Decode(message) => Self::Corrupt(message),
        }
    }
}

pub(crate) fn parse_timestamp(field: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| RepositoryError::Decode(format!("invalid {field} timestamp: {value}")))
}
