use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::pricing::formula;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    BasePrice,
    Discount,
    Surcharge,
    Freight,
    Tax,
    Rebate,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BasePrice => "base_price",
            Self::Discount => "discount",
            Self::Surcharge => "surcharge",
            Self::Freight => "freight",
            Self::Tax => "tax",
            Self::Rebate => "rebate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "base_price" => Some(Self::BasePrice),
            "discount" => Some(Self::Discount),
            "surcharge" => Some(Self::Surcharge),
            "freight" => Some(Self::Freight),
            "tax" => Some(Self::Tax),
            "rebate" => Some(Self::Rebate),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    Fixed,
    Percentage,
    Formula,
}

impl CalculationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Percentage => "percentage",
            Self::Formula => "formula",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "percentage" => Some(Self::Percentage),
            "formula" => Some(Self::Formula),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Customer,
    CustomerGroup,
    Product,
    ProductCategory,
    Quantity,
    Region,
    Channel,
    Currency,
    OrderValue,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::CustomerGroup => "customer_group",
            Self::Product => "product",
            Self::ProductCategory => "product_category",
            Self::Quantity => "quantity",
            Self::Region => "region",
            Self::Channel => "channel",
            Self::Currency => "currency",
            Self::OrderValue => "order_value",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "customer_group" => Some(Self::CustomerGroup),
            "product" => Some(Self::Product),
            "product_category" => Some(Self::ProductCategory),
            "quantity" => Some(Self::Quantity),
            "region" => Some(Self::Region),
            "channel" => Some(Self::Channel),
            "currency" => Some(Self::Currency),
            "order_value" => Some(Self::OrderValue),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Eq,
    Neq,
    In,
    Gt,
    Lt,
    Between,
}

impl RuleOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::In => "in",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Between => "between",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "in" => Some(Self::In),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "between" => Some(Self::Between),
            _ => None,
        }
    }
}

/// A single matching criterion. The rule value is kept in its authored
/// string form; the matcher interprets it per operator (`in` takes a
/// comma-separated list, `between` takes `"min,max"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRule {
    pub dimension: Dimension,
    pub operator: RuleOperator,
    pub value: String,
}

/// Quantity or order-value tier over the half-open range `[from, to)`.
/// A matching tier replaces the condition's nominal value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleTier {
    pub from: Decimal,
    pub to: Decimal,
    pub value: Decimal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleBasis {
    #[default]
    Quantity,
    OrderValue,
}

impl ScaleBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quantity => "quantity",
            Self::OrderValue => "order_value",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quantity" => Some(Self::Quantity),
            "order_value" => Some(Self::OrderValue),
            _ => None,
        }
    }
}

/// A configurable pricing rule. `value` carries its own arithmetic sign;
/// the engine applies it exactly as authored and never infers a sign
/// from `condition_type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingCondition {
    pub id: ConditionId,
    pub name: String,
    pub condition_type: ConditionType,
    pub calculation_type: CalculationType,
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub exclusive: bool,
    /// Matching criteria, combined with AND. Serialized as `conditions`
    /// to stay wire-compatible with the authoring export format.
    #[serde(rename = "conditions", default)]
    pub rules: Vec<DimensionRule>,
    #[serde(default)]
    pub scale: Vec<ScaleTier>,
    #[serde(default)]
    pub scale_basis: ScaleBasis,
}

impl PricingCondition {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(format!(
                "condition `{}` has an empty name",
                self.id.0
            )));
        }

        match self.calculation_type {
            CalculationType::Formula => {
                let text = self.formula.as_deref().map(str::trim).unwrap_or("");
                if text.is_empty() {
                    return Err(DomainError::InvariantViolation(format!(
                        "condition `{}` is formula-typed but has no formula",
                        self.id.0
                    )));
                }
                formula::check(text)?;
            }
            CalculationType::Fixed | CalculationType::Percentage => {
                if self.formula.is_some() {
                    return Err(DomainError::InvariantViolation(format!(
                        "condition `{}` carries a formula but is not formula-typed",
                        self.id.0
                    )));
                }
            }
        }

        for tier in &self.scale {
            if tier.from >= tier.to {
                return Err(DomainError::InvariantViolation(format!(
                    "condition `{}` has an empty scale tier [{}, {})",
                    self.id.0, tier.from, tier.to
                )));
            }
        }

        Ok(())
    }
}
