use thiserror::Error;

use crate::pricing::formula::FormulaError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Caller-facing failure layer. A calculation call either returns a
/// complete result (possibly with warnings) or exactly one of these.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}
