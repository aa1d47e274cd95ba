//! Demo condition set for local runs and end-to-end tests.

use rust_decimal::Decimal;

use pricefall_core::{
    CalculationType, ConditionId, ConditionType, Dimension, DimensionRule, PricingCondition,
    RuleOperator, ScaleBasis, ScaleTier,
};

use crate::repositories::{RepositoryError, SqlConditionRepository};
use crate::DbPool;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub conditions_inserted: usize,
}

pub fn demo_conditions() -> Vec<PricingCondition> {
    vec![
        PricingCondition {
            id: ConditionId("cond-volume-discount".to_string()),
            name: "Volume discount".to_string(),
            condition_type: ConditionType::Discount,
            calculation_type: CalculationType::Percentage,
            value: Decimal::new(-200, 2),
            formula: None,
            priority: 10,
            is_active: true,
            exclusive: false,
            rules: vec![DimensionRule {
                dimension: Dimension::Quantity,
                operator: RuleOperator::Gt,
                value: "0".to_string(),
            }],
            scale: vec![
                ScaleTier {
                    from: Decimal::from(10),
                    to: Decimal::from(50),
                    value: Decimal::new(-400, 2),
                },
                ScaleTier {
                    from: Decimal::from(50),
                    to: Decimal::from(10_000),
                    value: Decimal::new(-700, 2),
                },
            ],
            scale_basis: ScaleBasis::Quantity,
        },
        PricingCondition {
            id: ConditionId("cond-wholesale".to_string()),
            name: "Wholesale channel discount".to_string(),
            condition_type: ConditionType::Discount,
            calculation_type: CalculationType::Percentage,
            value: Decimal::new(-350, 2),
            formula: None,
            priority: 20,
            is_active: true,
            exclusive: false,
            rules: vec![DimensionRule {
                dimension: Dimension::CustomerGroup,
                operator: RuleOperator::Eq,
                value: "wholesale".to_string(),
            }],
            scale: Vec::new(),
            scale_basis: ScaleBasis::Quantity,
        },
        PricingCondition {
            id: ConditionId("cond-packing".to_string()),
            name: "Packing surcharge".to_string(),
            condition_type: ConditionType::Surcharge,
            calculation_type: CalculationType::Formula,
            value: Decimal::new(150, 2),
            formula: Some("qty * value".to_string()),
            priority: 30,
            is_active: true,
            exclusive: false,
            rules: Vec::new(),
            scale: Vec::new(),
            scale_basis: ScaleBasis::Quantity,
        },
        PricingCondition {
            id: ConditionId("cond-freight-emea".to_string()),
            name: "EMEA freight".to_string(),
            condition_type: ConditionType::Freight,
            calculation_type: CalculationType::Fixed,
            value: Decimal::new(1_995, 2),
            formula: None,
            priority: 40,
            is_active: true,
            exclusive: false,
            rules: vec![DimensionRule {
                dimension: Dimension::Region,
                operator: RuleOperator::In,
                value: "emea,uk".to_string(),
            }],
            scale: Vec::new(),
            scale_basis: ScaleBasis::Quantity,
        },
    ]
}

pub async fn seed_demo_conditions(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let repository = SqlConditionRepository::new(pool.clone());
    let conditions = demo_conditions();

    for condition in &conditions {
        repository.save(condition).await?;
    }

    Ok(SeedResult { conditions_inserted: conditions.len() })
}

#[cfg(test)]
mod tests {
    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::SqlConditionRepository;

    use super::{demo_conditions, seed_demo_conditions};

    #[test]
    fn demo_conditions_are_well_formed() {
        for condition in demo_conditions() {
            condition.validate().expect("demo condition validates");
        }
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrate");

        let first = seed_demo_conditions(&pool).await.expect("first seed");
        let second = seed_demo_conditions(&pool).await.expect("second seed");
        assert_eq!(first, second);

        let repository = SqlConditionRepository::new(pool);
        assert_eq!(repository.list_all().await.expect("list").len(), first.conditions_inserted);
    }
}
