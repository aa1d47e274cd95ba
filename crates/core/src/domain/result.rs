use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::condition::{ConditionId, ConditionType};
use crate::domain::context::{CustomerId, PricingContext, ProductId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub String);

impl ResultId {
    pub fn generate() -> Self {
        Self(format!("wf-{}", Uuid::new_v4()))
    }
}

/// One applied condition: the signed delta and the running total after
/// applying it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub condition_id: ConditionId,
    pub condition_name: String,
    pub condition_type: ConditionType,
    pub adjustment: Decimal,
    pub running_total: Decimal,
}

/// The pure calculation product, before it is stamped into a logged
/// record. `list_price + sum(adjustments) == final_price` holds exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waterfall {
    pub list_price: Decimal,
    pub final_price: Decimal,
    pub steps: Vec<WaterfallStep>,
    pub margin_pct: Option<Decimal>,
}

/// Append-only log record, created exactly once per calculation and
/// never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub id: ResultId,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub list_price: Decimal,
    pub final_price: Decimal,
    pub steps: Vec<WaterfallStep>,
    pub margin_pct: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl WaterfallResult {
    pub fn record(context: &PricingContext, waterfall: Waterfall) -> Self {
        Self {
            id: ResultId::generate(),
            product_id: context.product_id.clone(),
            customer_id: context.customer_id.clone(),
            list_price: waterfall.list_price,
            final_price: waterfall.final_price,
            steps: waterfall.steps,
            margin_pct: waterfall.margin_pct,
            created_at: Utc::now(),
        }
    }
}
