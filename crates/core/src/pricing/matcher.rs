//! Condition applicability: dimension rules combined with AND, plus
//! scale-tier resolution. Missing context data and numeric operators
//! over non-numeric values never match; they are not errors.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::condition::{DimensionRule, PricingCondition, RuleOperator, ScaleBasis};
use crate::domain::context::{DimensionValue, PricingContext};

#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub applies: bool,
    /// The condition's value for this evaluation, after any scale-tier
    /// override.
    pub resolved_value: Decimal,
    /// More than one scale tier covered the probe value; the first one
    /// in list order was used.
    pub scale_overlap: bool,
}

pub fn match_condition(condition: &PricingCondition, context: &PricingContext) -> MatchResult {
    let applies = condition.rules.iter().all(|rule| rule_applies(rule, context));
    if !applies {
        return MatchResult { applies: false, resolved_value: condition.value, scale_overlap: false };
    }

    let (resolved_value, scale_overlap) = resolve_scale(condition, context);
    MatchResult { applies: true, resolved_value, scale_overlap }
}

fn rule_applies(rule: &DimensionRule, context: &PricingContext) -> bool {
    let Some(actual) = context.dimension(rule.dimension) else {
        return false;
    };

    match rule.operator {
        RuleOperator::Eq => equals(&actual, &rule.value),
        RuleOperator::Neq => !equals(&actual, &rule.value),
        RuleOperator::In => rule
            .value
            .split(',')
            .any(|candidate| equals(&actual, candidate)),
        RuleOperator::Gt => match numeric(&actual) {
            Some(actual) => matches!(parse_decimal(&rule.value), Some(bound) if actual > bound),
            None => false,
        },
        RuleOperator::Lt => match numeric(&actual) {
            Some(actual) => matches!(parse_decimal(&rule.value), Some(bound) if actual < bound),
            None => false,
        },
        RuleOperator::Between => {
            let Some(actual) = numeric(&actual) else {
                return false;
            };
            let Some((min, max)) = parse_range(&rule.value) else {
                return false;
            };
            min <= actual && actual <= max
        }
    }
}

fn equals(actual: &DimensionValue, rule_value: &str) -> bool {
    match actual {
        DimensionValue::Text(text) => text.as_str() == rule_value.trim(),
        DimensionValue::Number(number) => {
            matches!(parse_decimal(rule_value), Some(expected) if *number == expected)
        }
    }
}

fn numeric(actual: &DimensionValue) -> Option<Decimal> {
    match actual {
        DimensionValue::Number(number) => Some(*number),
        DimensionValue::Text(_) => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

fn parse_range(text: &str) -> Option<(Decimal, Decimal)> {
    let (min, max) = text.split_once(',')?;
    Some((parse_decimal(min)?, parse_decimal(max)?))
}

fn resolve_scale(condition: &PricingCondition, context: &PricingContext) -> (Decimal, bool) {
    if condition.scale.is_empty() {
        return (condition.value, false);
    }

    let probe = match condition.scale_basis {
        ScaleBasis::Quantity => Some(context.quantity),
        ScaleBasis::OrderValue => context.order_value,
    };
    let Some(probe) = probe else {
        return (condition.value, false);
    };

    let mut selected = None;
    let mut matched = 0;
    for tier in &condition.scale {
        if tier.from <= probe && probe < tier.to {
            matched += 1;
            if selected.is_none() {
                selected = Some(tier.value);
            }
        }
    }

    (selected.unwrap_or(condition.value), matched > 1)
}
