//! In-memory port implementations for tests and light embedding. The
//! condition store is a plain `Vec` so insertion order, the priority
//! tie-break, is preserved exactly.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::RwLock;

use pricefall_core::service::{ConditionRepository, CostCatalog, ResultLog, StoreError};
use pricefall_core::{ConditionId, PricingCondition, ProductId, WaterfallResult};

#[derive(Default)]
pub struct InMemoryConditionRepository {
    conditions: RwLock<Vec<PricingCondition>>,
}

impl InMemoryConditionRepository {
    pub async fn save(&self, condition: PricingCondition) {
        let mut conditions = self.conditions.write().await;
        match conditions.iter_mut().find(|existing| existing.id == condition.id) {
            Some(existing) => *existing = condition,
            None => conditions.push(condition),
        }
    }

    pub async fn delete(&self, id: &ConditionId) -> bool {
        let mut conditions = self.conditions.write().await;
        let before = conditions.len();
        conditions.retain(|condition| condition.id != *id);
        conditions.len() < before
    }

    pub async fn list_all(&self) -> Vec<PricingCondition> {
        self.conditions.read().await.clone()
    }
}

#[async_trait::async_trait]
impl ConditionRepository for InMemoryConditionRepository {
    async fn list_active(&self) -> Result<Vec<PricingCondition>, StoreError> {
        let conditions = self.conditions.read().await;
        Ok(conditions.iter().filter(|condition| condition.is_active).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryResultLog {
    records: RwLock<Vec<WaterfallResult>>,
}

#[async_trait::async_trait]
impl ResultLog for InMemoryResultLog {
    async fn append(&self, result: WaterfallResult) -> Result<(), StoreError> {
        self.records.write().await.push(result);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WaterfallResult>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

#[derive(Default)]
pub struct InMemoryCostCatalog {
    costs: RwLock<HashMap<String, Decimal>>,
}

impl InMemoryCostCatalog {
    pub async fn set_cost(&self, product_id: impl Into<String>, unit_cost: Decimal) {
        self.costs.write().await.insert(product_id.into(), unit_cost);
    }
}

#[async_trait::async_trait]
impl CostCatalog for InMemoryCostCatalog {
    async fn unit_cost(&self, product_id: &ProductId) -> Result<Option<Decimal>, StoreError> {
        Ok(self.costs.read().await.get(&product_id.0).copied())
    }
}
