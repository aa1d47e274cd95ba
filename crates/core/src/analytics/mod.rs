//! Grouped margin reporting over the accumulated result log.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::result::WaterfallResult;
use crate::pricing::waterfall::{round_margin, round_minor_unit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Product,
    Customer,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Customer => "customer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "product" => Some(Self::Product),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }
}

/// One aggregation row. Records without a margin are excluded from the
/// margin average but still counted and averaged into the prices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarginSummary {
    pub key: String,
    pub avg_list_price: Decimal,
    pub avg_final_price: Decimal,
    pub avg_margin_pct: Option<Decimal>,
    pub count: u64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    list_sum: Decimal,
    final_sum: Decimal,
    margin_sum: Decimal,
    margin_count: u64,
}

impl Accumulator {
    fn into_summary(self, key: String) -> MarginSummary {
        let count = Decimal::from(self.count);
        let avg_margin_pct = if self.margin_count > 0 {
            Some(round_margin(self.margin_sum / Decimal::from(self.margin_count)))
        } else {
            None
        };

        MarginSummary {
            key,
            avg_list_price: round_minor_unit(self.list_sum / count),
            avg_final_price: round_minor_unit(self.final_sum / count),
            avg_margin_pct,
            count: self.count,
        }
    }
}

/// Average list/final price and margin per product or customer, keyed
/// and sorted by the grouping value for deterministic output.
pub fn summarize(results: &[WaterfallResult], group_by: GroupBy) -> Vec<MarginSummary> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

    for result in results {
        let key = match group_by {
            GroupBy::Product => result.product_id.0.clone(),
            GroupBy::Customer => result.customer_id.0.clone(),
        };
        let group = groups.entry(key).or_default();
        group.count += 1;
        group.list_sum += result.list_price;
        group.final_sum += result.final_price;
        if let Some(margin) = result.margin_pct {
            group.margin_sum += margin;
            group.margin_count += 1;
        }
    }

    groups.into_iter().map(|(key, group)| group.into_summary(key)).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use crate::domain::context::{CustomerId, ProductId};
    use crate::domain::result::{ResultId, WaterfallResult};

    use super::{summarize, GroupBy};

    fn result(
        product: &str,
        customer: &str,
        list_price: Decimal,
        final_price: Decimal,
        margin_pct: Option<Decimal>,
    ) -> WaterfallResult {
        WaterfallResult {
            id: ResultId::generate(),
            product_id: ProductId(product.to_string()),
            customer_id: CustomerId(customer.to_string()),
            list_price,
            final_price,
            steps: Vec::new(),
            margin_pct,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_by_product_and_averages_prices() {
        let results = vec![
            result("pump", "acme", Decimal::from(100), Decimal::from(90), None),
            result("pump", "blue", Decimal::from(200), Decimal::from(150), None),
            result("valve", "acme", Decimal::from(50), Decimal::from(50), None),
        ];

        let summaries = summarize(&results, GroupBy::Product);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].key, "pump");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].avg_list_price, Decimal::new(15_000, 2));
        assert_eq!(summaries[0].avg_final_price, Decimal::new(12_000, 2));
        assert_eq!(summaries[1].key, "valve");
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn null_margins_are_counted_but_excluded_from_the_margin_average() {
        let results = vec![
            result("pump", "acme", Decimal::from(100), Decimal::from(90), Some(Decimal::new(200, 1))),
            result("pump", "acme", Decimal::from(100), Decimal::from(80), Some(Decimal::new(100, 1))),
            result("pump", "acme", Decimal::from(100), Decimal::from(70), None),
        ];

        let summaries = summarize(&results, GroupBy::Product);

        assert_eq!(summaries[0].count, 3);
        // (20.0 + 10.0) / 2, the cost-less record does not dilute it
        assert_eq!(summaries[0].avg_margin_pct, Some(Decimal::new(150, 1)));
        assert_eq!(summaries[0].avg_final_price, Decimal::new(8_000, 2));
    }

    #[test]
    fn all_null_margins_yield_no_margin_average() {
        let results = vec![result("pump", "acme", Decimal::from(100), Decimal::from(90), None)];

        let summaries = summarize(&results, GroupBy::Product);
        assert_eq!(summaries[0].avg_margin_pct, None);
    }

    #[test]
    fn groups_by_customer_with_sorted_keys() {
        let results = vec![
            result("pump", "zenith", Decimal::from(10), Decimal::from(10), None),
            result("pump", "acme", Decimal::from(10), Decimal::from(10), None),
        ];

        let summaries = summarize(&results, GroupBy::Customer);
        let keys: Vec<&str> = summaries.iter().map(|summary| summary.key.as_str()).collect();
        assert_eq!(keys, vec!["acme", "zenith"]);
    }

    #[test]
    fn empty_log_produces_no_rows() {
        assert!(summarize(&[], GroupBy::Product).is_empty());
    }

    #[test]
    fn group_by_round_trips() {
        for group_by in [GroupBy::Product, GroupBy::Customer] {
            assert_eq!(GroupBy::parse(group_by.as_str()), Some(group_by));
        }
    }
}
