//! Append-only SQLite result log.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use pricefall_core::service::ResultLog;
use pricefall_core::{
    CustomerId, ProductId, ResultId, StoreError, WaterfallResult, WaterfallStep,
};

use super::{parse_timestamp, RepositoryError};
use crate::DbPool;

pub struct SqlResultLog {
    pool: DbPool,
}

impl SqlResultLog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, result: &WaterfallResult) -> Result<(), RepositoryError> {
        let steps_json = serde_json::to_string(&result.steps)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO waterfall_result (
                id, product_id, customer_id, list_price, final_price,
                steps_json, margin_pct, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id.0)
        .bind(&result.product_id.0)
        .bind(&result.customer_id.0)
        .bind(result.list_price.to_string())
        .bind(result.final_price.to_string())
        .bind(&steps_json)
        .bind(result.margin_pct.map(|margin| margin.to_string()))
        .bind(result.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<WaterfallResult>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, customer_id, list_price, final_price,
                   steps_json, margin_pct, created_at
            FROM waterfall_result
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(result_from_row).collect()
    }
}

#[async_trait::async_trait]
impl ResultLog for SqlResultLog {
    async fn append(&self, result: WaterfallResult) -> Result<(), StoreError> {
        self.insert(&result).await.map_err(StoreError::from)
    }

    async fn list(&self) -> Result<Vec<WaterfallResult>, StoreError> {
        self.fetch_all().await.map_err(StoreError::from)
    }
}

fn result_from_row(row: &SqliteRow) -> Result<WaterfallResult, RepositoryError> {
    let id: String = row.try_get("id")?;
    let product_id: String = row.try_get("product_id")?;
    let customer_id: String = row.try_get("customer_id")?;
    let steps_json: String = row.try_get("steps_json")?;
    let margin_pct: Option<String> = row.try_get("margin_pct")?;
    let created_at: String = row.try_get("created_at")?;

    let steps: Vec<WaterfallStep> = serde_json::from_str(&steps_json)
        .map_err(|error| RepositoryError::Decode(format!("invalid steps_json: {error}")))?;

    Ok(WaterfallResult {
        id: ResultId(id),
        product_id: ProductId(product_id),
        customer_id: CustomerId(customer_id),
        list_price: decode_decimal(row, "list_price")?,
        final_price: decode_decimal(row, "final_price")?,
        steps,
        margin_pct: margin_pct
            .map(|value| {
                Decimal::from_str(&value)
                    .map_err(|_| RepositoryError::Decode(format!("invalid margin_pct: {value}")))
            })
            .transpose()?,
        created_at: parse_timestamp("created_at", created_at)?,
    })
}

fn decode_decimal(row: &SqliteRow, field: &str) -> Result<Decimal, RepositoryError> {
    let value: String = row.try_get(field)?;
    Decimal::from_str(&value)
        .map_err(|_| RepositoryError::Decode(format!("invalid {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use pricefall_core::service::ResultLog;
    use pricefall_core::{
        ConditionId, ConditionType, CustomerId, ProductId, ResultId, WaterfallResult,
        WaterfallStep,
    };

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::DbPool;

    use super::SqlResultLog;

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        pool
    }

    fn result(id: &str, margin_pct: Option<Decimal>) -> WaterfallResult {
        WaterfallResult {
            id: ResultId(id.to_string()),
            product_id: ProductId("pump-ax7".to_string()),
            customer_id: CustomerId("acme".to_string()),
            list_price: Decimal::new(10_000, 2),
            final_price: Decimal::new(9_000, 2),
            steps: vec![WaterfallStep {
                condition_id: ConditionId("cond-1".to_string()),
                condition_name: "Contract discount".to_string(),
                condition_type: ConditionType::Discount,
                adjustment: Decimal::new(-1_000, 2),
                running_total: Decimal::new(9_000, 2),
            }],
            margin_pct,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn append_then_list_round_trips() {
        let log = SqlResultLog::new(pool().await);
        let with_margin = result("wf-1", Some(Decimal::new(333, 1)));
        let without_margin = result("wf-2", None);

        log.append(with_margin.clone()).await.expect("append first");
        log.append(without_margin.clone()).await.expect("append second");

        let listed = log.list().await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, with_margin.id);
        assert_eq!(listed[0].margin_pct, Some(Decimal::new(333, 1)));
        assert_eq!(listed[0].steps, with_margin.steps);
        assert_eq!(listed[1].margin_pct, None);
    }

    #[tokio::test]
    async fn timestamps_survive_the_round_trip_to_the_second() {
        let log = SqlResultLog::new(pool().await);
        let original = result("wf-ts", None);

        log.append(original.clone()).await.expect("append");
        let listed = log.list().await.expect("list");

        assert_eq!(listed[0].created_at.timestamp(), original.created_at.timestamp());
    }
}
