//! The waterfall fold: filter, match, order, apply, round, reconcile.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::condition::{CalculationType, ConditionId, PricingCondition};
use crate::domain::context::PricingContext;
use crate::domain::result::{Waterfall, WaterfallStep};
use crate::pricing::formula::{self, FormulaInputs};
use crate::pricing::matcher;

/// Currency minor unit: every adjustment is rounded to this scale
/// before it is applied, so the step ledger reconciles penny-exact.
pub const MINOR_UNIT_SCALE: u32 = 2;
pub const MARGIN_SCALE: u32 = 1;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Non-fatal findings attached next to a result. A broken condition
/// never aborts the calculation; it is skipped and reported here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationWarning {
    ConditionSkipped { condition_id: ConditionId, detail: String },
    OverlappingScaleTiers { condition_id: ConditionId },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationOutcome {
    pub waterfall: Waterfall,
    pub warnings: Vec<CalculationWarning>,
}

pub fn round_minor_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_margin(pct: Decimal) -> Decimal {
    pct.round_dp_with_strategy(MARGIN_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `(final - cost) / final * 100`, or `None` when the final price is
/// zero and the ratio is undefined.
pub fn margin_pct(final_price: Decimal, unit_cost: Decimal) -> Option<Decimal> {
    if final_price.is_zero() {
        return None;
    }
    let ratio = (final_price - unit_cost).checked_div(final_price)?;
    Some(round_margin(ratio.checked_mul(HUNDRED)?))
}

/// Pure fold over the condition set. Deterministic for identical
/// inputs: active conditions are matched, stable-sorted by priority
/// (repository order breaks ties), and applied to a running total that
/// starts at the list price. An applied `exclusive` condition stops the
/// fold.
pub fn calculate_waterfall(
    context: &PricingContext,
    conditions: &[PricingCondition],
    unit_cost: Option<Decimal>,
) -> CalculationOutcome {
    let mut warnings = Vec::new();
    let mut applicable: Vec<(&PricingCondition, Decimal)> = Vec::new();

    for condition in conditions.iter().filter(|condition| condition.is_active) {
        let matched = matcher::match_condition(condition, context);
        if !matched.applies {
            continue;
        }
        if matched.scale_overlap {
            warnings.push(CalculationWarning::OverlappingScaleTiers {
                condition_id: condition.id.clone(),
            });
        }
        applicable.push((condition, matched.resolved_value));
    }

    // Stable: equal priorities keep their repository order.
    applicable.sort_by_key(|(condition, _)| condition.priority);

    let mut running_total = context.list_price;
    let mut steps = Vec::new();

    for (condition, resolved_value) in applicable {
        let adjustment = match compute_adjustment(condition, resolved_value, running_total, context)
        {
            Ok(adjustment) => round_minor_unit(adjustment),
            Err(detail) => {
                warnings.push(CalculationWarning::ConditionSkipped {
                    condition_id: condition.id.clone(),
                    detail,
                });
                continue;
            }
        };

        let Some(next_total) = running_total.checked_add(adjustment) else {
            warnings.push(CalculationWarning::ConditionSkipped {
                condition_id: condition.id.clone(),
                detail: "running total out of range".to_string(),
            });
            continue;
        };

        running_total = next_total;
        steps.push(WaterfallStep {
            condition_id: condition.id.clone(),
            condition_name: condition.name.clone(),
            condition_type: condition.condition_type,
            adjustment,
            running_total,
        });

        // Exclusivity binds only once the condition is actually applied.
        if condition.exclusive {
            break;
        }
    }

    let final_price = running_total;
    let margin_pct = unit_cost.and_then(|cost| margin_pct(final_price, cost));

    CalculationOutcome {
        waterfall: Waterfall { list_price: context.list_price, final_price, steps, margin_pct },
        warnings,
    }
}

fn compute_adjustment(
    condition: &PricingCondition,
    resolved_value: Decimal,
    running_total: Decimal,
    context: &PricingContext,
) -> Result<Decimal, String> {
    match condition.calculation_type {
        CalculationType::Fixed => Ok(resolved_value),
        CalculationType::Percentage => running_total
            .checked_mul(resolved_value)
            .and_then(|product| product.checked_div(HUNDRED))
            .ok_or_else(|| "percentage adjustment out of range".to_string()),
        CalculationType::Formula => {
            let Some(text) = condition.formula.as_deref() else {
                return Err("formula text missing".to_string());
            };
            let inputs = FormulaInputs {
                price: running_total,
                qty: context.quantity,
                value: resolved_value,
            };
            formula::evaluate(text, &inputs).map_err(|error| error.to_string())
        }
    }
}
