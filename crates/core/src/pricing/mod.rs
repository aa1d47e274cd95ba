pub mod formula;
pub mod matcher;
pub mod waterfall;

use rust_decimal::Decimal;

use crate::domain::condition::PricingCondition;
use crate::domain::context::PricingContext;

pub use self::matcher::{match_condition, MatchResult};
pub use self::waterfall::{calculate_waterfall, CalculationOutcome, CalculationWarning};

/// Seam for the calculation step. The deterministic implementation is
/// the production engine; tests swap in their own.
pub trait WaterfallEngine: Send + Sync {
    fn calculate(
        &self,
        context: &PricingContext,
        conditions: &[PricingCondition],
        unit_cost: Option<Decimal>,
    ) -> CalculationOutcome;
}

#[derive(Default)]
pub struct DeterministicWaterfallEngine;

impl WaterfallEngine for DeterministicWaterfallEngine {
    fn calculate(
        &self,
        context: &PricingContext,
        conditions: &[PricingCondition],
        unit_cost: Option<Decimal>,
    ) -> CalculationOutcome {
        calculate_waterfall(context, conditions, unit_cost)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::context::PricingContext;
    use crate::domain::result::Waterfall;

    use super::{
        CalculationOutcome, DeterministicWaterfallEngine, WaterfallEngine,
    };

    #[test]
    fn deterministic_engine_delegates_to_the_pure_fold() {
        let engine = DeterministicWaterfallEngine;
        let context =
            PricingContext::new("pump-ax7", "acme", Decimal::from(1), Decimal::from(100));

        let outcome = engine.calculate(&context, &[], None);

        assert_eq!(outcome.waterfall.final_price, Decimal::from(100));
        assert!(outcome.waterfall.steps.is_empty());
    }

    #[test]
    fn engine_seam_accepts_test_doubles() {
        struct FlatEngine;

        impl WaterfallEngine for FlatEngine {
            fn calculate(
                &self,
                context: &PricingContext,
                _conditions: &[crate::domain::condition::PricingCondition],
                _unit_cost: Option<Decimal>,
            ) -> CalculationOutcome {
                CalculationOutcome {
                    waterfall: Waterfall {
                        list_price: context.list_price,
                        final_price: context.list_price,
                        steps: Vec::new(),
                        margin_pct: None,
                    },
                    warnings: Vec::new(),
                }
            }
        }

        let context =
            PricingContext::new("pump-ax7", "acme", Decimal::from(1), Decimal::from(42));
        let outcome = FlatEngine.calculate(&context, &[], None);
        assert_eq!(outcome.waterfall.final_price, Decimal::from(42));
    }
}
