//! SQLite condition store. The engine reads through the
//! `ConditionRepository` port; `save`/`delete`/`list_all` serve the
//! authoring surface and fixtures.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use pricefall_core::service::ConditionRepository;
use pricefall_core::{
    CalculationType, ConditionId, ConditionType, DimensionRule, PricingCondition, ScaleBasis,
    ScaleTier, StoreError,
};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlConditionRepository {
    pool: DbPool,
}

impl SqlConditionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or update. New conditions are appended at the end of the
    /// authoring order; updates keep their original position.
    pub async fn save(&self, condition: &PricingCondition) -> Result<(), RepositoryError> {
        let rules_json = serde_json::to_string(&condition.rules)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let scale_json = serde_json::to_string(&condition.scale)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO pricing_condition (
                id, name, condition_type, calculation_type, value, formula,
                priority, is_active, is_exclusive, rules_json, scale_json,
                scale_basis, position, created_at
            ) VALUES (
                ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM pricing_condition),
                ?
            )
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                condition_type = excluded.condition_type,
                calculation_type = excluded.calculation_type,
                value = excluded.value,
                formula = excluded.formula,
                priority = excluded.priority,
                is_active = excluded.is_active,
                is_exclusive = excluded.is_exclusive,
                rules_json = excluded.rules_json,
                scale_json = excluded.scale_json,
                scale_basis = excluded.scale_basis
            "#,
        )
        .bind(&condition.id.0)
        .bind(&condition.name)
        .bind(condition.condition_type.as_str())
        .bind(condition.calculation_type.as_str())
        .bind(condition.value.to_string())
        .bind(condition.formula.as_deref())
        .bind(condition.priority)
        .bind(condition.is_active)
        .bind(condition.exclusive)
        .bind(&rules_json)
        .bind(&scale_json)
        .bind(condition.scale_basis.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: &ConditionId) -> Result<bool, RepositoryError> {
        let outcome = sqlx::query("DELETE FROM pricing_condition WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(outcome.rows_affected() > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<PricingCondition>, RepositoryError> {
        let rows = sqlx::query(&select_columns("ORDER BY position ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(condition_from_row).collect()
    }

    async fn fetch_active(&self) -> Result<Vec<PricingCondition>, RepositoryError> {
        let rows = sqlx::query(&select_columns("WHERE is_active = 1 ORDER BY position ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(condition_from_row).collect()
    }
}

#[async_trait::async_trait]
impl ConditionRepository for SqlConditionRepository {
    async fn list_active(&self) -> Result<Vec<PricingCondition>, StoreError> {
        self.fetch_active().await.map_err(StoreError::from)
    }
}

fn select_columns(tail: &str) -> String {
    format!(
        "SELECT id, name, condition_type, calculation_type, value, formula, \
         priority, is_active, is_exclusive, rules_json, scale_json, scale_basis \
         FROM pricing_condition {tail}"
    )
}

fn condition_from_row(row: &SqliteRow) -> Result<PricingCondition, RepositoryError> {
    let id: String = row.try_get("id")?;
    let condition_type: String = row.try_get("condition_type")?;
    let calculation_type: String = row.try_get("calculation_type")?;
    let value: String = row.try_get("value")?;
    let rules_json: String = row.try_get("rules_json")?;
    let scale_json: String = row.try_get("scale_json")?;
    let scale_basis: String = row.try_get("scale_basis")?;

    let rules: Vec<DimensionRule> = serde_json::from_str(&rules_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid rules_json: {error}")))?;
    let scale: Vec<ScaleTier> = serde_json::from_str(&scale_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid scale_json: {error}")))?;

    Ok(PricingCondition {
        id: ConditionId(id),
        name: row.try_get("name")?,
        condition_type: ConditionType::parse(&condition_type).ok_or_else(|| {
            RepositoryError::Decode(format!("invalid condition_type: {condition_type}"))
        })?,
        calculation_type: CalculationType::parse(&calculation_type).ok_or_else(|| {
            RepositoryError::Decode(format!("invalid calculation_type: {calculation_type}"))
        })?,
        value: Decimal::from_str(&value)
            .map_err(|_| RepositoryError::Decode(format!("invalid value: {value}")))?,
        formula: row.try_get("formula")?,
        priority: row.try_get("priority")?,
        is_active: row.try_get("is_active")?,
        exclusive: row.try_get("is_exclusive")?,
        rules,
        scale,
        scale_basis: ScaleBasis::parse(&scale_basis).ok_or_else(|| {
            RepositoryError::Decode(format!("invalid scale_basis: {scale_basis}"))
        })?,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use pricefall_core::service::ConditionRepository;
    use pricefall_core::{
        CalculationType, ConditionId, ConditionType, Dimension, DimensionRule, PricingCondition,
        RuleOperator, ScaleBasis, ScaleTier,
    };

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::DbPool;

    use super::SqlConditionRepository;

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        pool
    }

    fn condition(id: &str, priority: i32) -> PricingCondition {
        PricingCondition {
            id: ConditionId(id.to_string()),
            name: format!("{id} rule"),
            condition_type: ConditionType::Discount,
            calculation_type: CalculationType::Percentage,
            value: Decimal::new(-500, 2),
            formula: None,
            priority,
            is_active: true,
            exclusive: false,
            rules: vec![DimensionRule {
                dimension: Dimension::Quantity,
                operator: RuleOperator::Between,
                value: "10,50".to_string(),
            }],
            scale: vec![ScaleTier {
                from: Decimal::ZERO,
                to: Decimal::from(100),
                value: Decimal::new(-750, 2),
            }],
            scale_basis: ScaleBasis::Quantity,
        }
    }

    #[tokio::test]
    async fn save_then_list_active_round_trips_every_field() {
        let repository = SqlConditionRepository::new(pool().await);
        let original = condition("cond-1", 10);

        repository.save(&original).await.expect("save");
        let listed = repository.list_active().await.expect("list");

        assert_eq!(listed, vec![original]);
    }

    #[tokio::test]
    async fn list_active_excludes_inactive_and_keeps_authoring_order() {
        let repository = SqlConditionRepository::new(pool().await);

        let mut retired = condition("retired", 1);
        retired.is_active = false;
        repository.save(&condition("first", 30)).await.expect("save first");
        repository.save(&retired).await.expect("save retired");
        repository.save(&condition("second", 20)).await.expect("save second");

        let listed = repository.list_active().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|entry| entry.id.0.as_str()).collect();

        // authoring order, not priority order: ordering by priority is
        // the calculator's job
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn updates_keep_the_original_position() {
        let repository = SqlConditionRepository::new(pool().await);

        repository.save(&condition("alpha", 1)).await.expect("save alpha");
        repository.save(&condition("bravo", 2)).await.expect("save bravo");

        let mut renamed = condition("alpha", 1);
        renamed.name = "Alpha renamed".to_string();
        repository.save(&renamed).await.expect("update alpha");

        let listed = repository.list_all().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|entry| entry.id.0.as_str()).collect();

        assert_eq!(ids, vec!["alpha", "bravo"]);
        assert_eq!(listed[0].name, "Alpha renamed");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let repository = SqlConditionRepository::new(pool().await);
        repository.save(&condition("doomed", 1)).await.expect("save");

        assert!(repository.delete(&ConditionId("doomed".to_string())).await.expect("delete"));
        assert!(!repository.delete(&ConditionId("doomed".to_string())).await.expect("redelete"));
        assert!(repository.list_all().await.expect("list").is_empty());
    }
}
