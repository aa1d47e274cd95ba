pub mod analytics;
pub mod config;
pub mod domain;
pub mod errors;
pub mod exchange;
pub mod pricing;
pub mod service;
pub mod telemetry;

pub use analytics::{summarize, GroupBy, MarginSummary};
pub use domain::condition::{
    CalculationType, ConditionId, ConditionType, Dimension, DimensionRule, PricingCondition,
    RuleOperator, ScaleBasis, ScaleTier,
};
pub use domain::context::{CustomerId, DimensionValue, PricingContext, ProductId};
pub use domain::result::{ResultId, Waterfall, WaterfallResult, WaterfallStep};
pub use errors::{ApplicationError, DomainError};
pub use exchange::{export_conditions, import_conditions, ConditionExport, ExchangeError};
pub use pricing::formula::{FormulaError, FormulaInputs};
pub use pricing::{
    calculate_waterfall, match_condition, CalculationOutcome, CalculationWarning,
    DeterministicWaterfallEngine, MatchResult, WaterfallEngine,
};
pub use service::{
    ConditionRepository, CostCatalog, PricingService, ResultLog, SimulationOutcome, StoreError,
};
