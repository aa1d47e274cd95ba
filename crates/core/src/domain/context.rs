use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::condition::Dimension;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// A context dimension is either free text (region, channel, ...) or a
/// number (quantity, order value). The matcher dispatches on this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionValue {
    Text(String),
    Number(Decimal),
}

/// Calculation input supplied by the caller. Optional fields are
/// dimensions the caller may not know; rules over an absent dimension
/// simply never match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub quantity: Decimal,
    pub list_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_value: Option<Decimal>,
}

impl PricingContext {
    pub fn new(
        product_id: impl Into<String>,
        customer_id: impl Into<String>,
        quantity: Decimal,
        list_price: Decimal,
    ) -> Self {
        Self {
            product_id: ProductId(product_id.into()),
            customer_id: CustomerId(customer_id.into()),
            quantity,
            list_price,
            customer_group: None,
            product_category: None,
            region: None,
            channel: None,
            currency: None,
            order_value: None,
        }
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<DimensionValue> {
        match dimension {
            Dimension::Customer => Some(DimensionValue::Text(self.customer_id.0.clone())),
            Dimension::Product => Some(DimensionValue::Text(self.product_id.0.clone())),
            Dimension::Quantity => Some(DimensionValue::Number(self.quantity)),
            Dimension::OrderValue => self.order_value.map(DimensionValue::Number),
            Dimension::CustomerGroup => {
                self.customer_group.clone().map(DimensionValue::Text)
            }
            Dimension::ProductCategory => {
                self.product_category.clone().map(DimensionValue::Text)
            }
            Dimension::Region => self.region.clone().map(DimensionValue::Text),
            Dimension::Channel => self.channel.clone().map(DimensionValue::Text),
            Dimension::Currency => self.currency.clone().map(DimensionValue::Text),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity < Decimal::ZERO {
            return Err(DomainError::InvariantViolation(format!(
                "quantity must be non-negative, got {}",
                self.quantity
            )));
        }
        if self.list_price < Decimal::ZERO {
            return Err(DomainError::InvariantViolation(format!(
                "list price must be non-negative, got {}",
                self.list_price
            )));
        }
        Ok(())
    }
}
