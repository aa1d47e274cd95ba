//! Lossless export/import of condition sets. The JSON payload must
//! round-trip every field, nested rules and scale tiers in their
//! original order included.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::condition::PricingCondition;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionExport {
    pub version: u32,
    pub conditions: Vec<PricingCondition>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("could not serialize condition set: {0}")]
    Serialize(String),
    #[error("could not parse condition export: {0}")]
    Parse(String),
    #[error("unsupported export version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid condition in export: {0}")]
    InvalidCondition(String),
}

pub fn export_conditions(conditions: &[PricingCondition]) -> Result<String, ExchangeError> {
    let envelope = ConditionExport { version: EXPORT_VERSION, conditions: conditions.to_vec() };
    serde_json::to_string_pretty(&envelope)
        .map_err(|error| ExchangeError::Serialize(error.to_string()))
}

pub fn import_conditions(payload: &str) -> Result<Vec<PricingCondition>, ExchangeError> {
    let envelope: ConditionExport =
        serde_json::from_str(payload).map_err(|error| ExchangeError::Parse(error.to_string()))?;

    if envelope.version != EXPORT_VERSION {
        return Err(ExchangeError::UnsupportedVersion(envelope.version));
    }

    for condition in &envelope.conditions {
        condition
            .validate()
            .map_err(|error| ExchangeError::InvalidCondition(error.to_string()))?;
    }

    Ok(envelope.conditions)
}
