//! Transport-agnostic operations: `simulate` and `aggregate`.
//!
//! The engine consumes three external collaborators through async
//! ports. Infrastructure failures on any port abort the call with a
//! typed error; per-condition failures inside the calculation surface
//! only as warnings next to a complete result.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{self, GroupBy, MarginSummary};
use crate::domain::condition::PricingCondition;
use crate::domain::context::{PricingContext, ProductId};
use crate::domain::result::WaterfallResult;
use crate::errors::ApplicationError;
use crate::pricing::{CalculationWarning, DeterministicWaterfallEngine, WaterfallEngine};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait ConditionRepository: Send + Sync {
    /// Active conditions in authoring order. That order is the
    /// tie-break for equal priorities, so implementations must not
    /// reorder.
    async fn list_active(&self) -> Result<Vec<PricingCondition>, StoreError>;
}

#[async_trait]
pub trait CostCatalog: Send + Sync {
    /// `Ok(None)` means the cost is unknown; the margin stays unset.
    async fn unit_cost(&self, product_id: &ProductId) -> Result<Option<Decimal>, StoreError>;
}

#[async_trait]
pub trait ResultLog: Send + Sync {
    async fn append(&self, result: WaterfallResult) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<WaterfallResult>, StoreError>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub result: WaterfallResult,
    pub warnings: Vec<CalculationWarning>,
}

pub struct PricingService<R, C, L, E = DeterministicWaterfallEngine> {
    repository: R,
    catalog: C,
    log: L,
    engine: E,
}

impl<R, C, L> PricingService<R, C, L>
where
    R: ConditionRepository,
    C: CostCatalog,
    L: ResultLog,
{
    pub fn new(repository: R, catalog: C, log: L) -> Self {
        Self::with_engine(repository, catalog, log, DeterministicWaterfallEngine)
    }
}

impl<R, C, L, E> PricingService<R, C, L, E>
where
    R: ConditionRepository,
    C: CostCatalog,
    L: ResultLog,
    E: WaterfallEngine,
{
    pub fn with_engine(repository: R, catalog: C, log: L, engine: E) -> Self {
        Self { repository, catalog, log, engine }
    }

    pub async fn simulate(
        &self,
        context: PricingContext,
    ) -> Result<SimulationOutcome, ApplicationError> {
        context.validate()?;

        let conditions = self
            .repository
            .list_active()
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        let unit_cost = self
            .catalog
            .unit_cost(&context.product_id)
            .await
            .map_err(|error| ApplicationError::Integration(error.to_string()))?;

        let outcome = self.engine.calculate(&context, &conditions, unit_cost);
        for warning in &outcome.warnings {
            match warning {
                CalculationWarning::ConditionSkipped { condition_id, detail } => {
                    tracing::warn!(
                        condition_id = %condition_id.0,
                        %detail,
                        "condition skipped during waterfall"
                    );
                }
                CalculationWarning::OverlappingScaleTiers { condition_id } => {
                    tracing::warn!(
                        condition_id = %condition_id.0,
                        "overlapping scale tiers, first tier in list order used"
                    );
                }
            }
        }

        let result = WaterfallResult::record(&context, outcome.waterfall);
        self.log
            .append(result.clone())
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        tracing::info!(
            result_id = %result.id.0,
            product_id = %result.product_id.0,
            customer_id = %result.customer_id.0,
            steps = result.steps.len(),
            warnings = outcome.warnings.len(),
            "waterfall simulation recorded"
        );

        Ok(SimulationOutcome { result, warnings: outcome.warnings })
    }

    pub async fn aggregate(
        &self,
        group_by: GroupBy,
    ) -> Result<Vec<MarginSummary>, ApplicationError> {
        let records = self
            .log
            .list()
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;

        Ok(analytics::summarize(&records, group_by))
    }
}
