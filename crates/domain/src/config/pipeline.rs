use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money;

pub const D_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const D_MAX_QUANTITY_PER_ITEM: u32 = 10;
pub const D_MAX_ITEMS_PER_ORDER: usize = 50;
pub const D_MAX_ORDER_TOTAL: &str = "200.00";

fn d_confidence_threshold() -> f64 {
    D_CONFIDENCE_THRESHOLD
}
fn d_max_quantity_per_item() -> u32 {
    D_MAX_QUANTITY_PER_ITEM
}
fn d_max_items_per_order() -> usize {
    D_MAX_ITEMS_PER_ORDER
}
fn d_max_order_total() -> Decimal {
    money::parse(D_MAX_ORDER_TOTAL).expect("default max_order_total parses")
}
fn d_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIngredientPolicy {
    Warn,
    Reject,
}

impl Default for UnknownIngredientPolicy {
    fn default() -> Self {
        UnknownIngredientPolicy::Warn
    }
}

fn d_unknown_ingredient_policy() -> UnknownIngredientPolicy {
    UnknownIngredientPolicy::default()
}

/// Limits and feature toggles the Command Bus (C3) enforces on every
/// mutating command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "d_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "d_max_quantity_per_item")]
    pub max_quantity_per_item: u32,
    #[serde(default = "d_max_items_per_order")]
    pub max_items_per_order: usize,
    #[serde(default = "d_max_order_total")]
    pub max_order_total: Decimal,
    #[serde(default = "d_true")]
    pub allow_negative_inventory: bool,
    #[serde(default = "d_true")]
    pub enable_customization_validation: bool,
    #[serde(default = "d_true")]
    pub enable_inventory_checking: bool,
    #[serde(default = "d_true")]
    pub enable_order_limits: bool,
    #[serde(default = "d_unknown_ingredient_policy")]
    pub unknown_ingredient_policy: UnknownIngredientPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: d_confidence_threshold(),
            max_quantity_per_item: d_max_quantity_per_item(),
            max_items_per_order: d_max_items_per_order(),
            max_order_total: d_max_order_total(),
            allow_negative_inventory: true,
            enable_customization_validation: true,
            enable_inventory_checking: true,
            enable_order_limits: true,
            unknown_ingredient_policy: UnknownIngredientPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_serde_defaults() {
        let a = PipelineConfig::default();
        let b: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(a.confidence_threshold, b.confidence_threshold);
        assert_eq!(a.max_order_total, b.max_order_total);
        assert_eq!(a.unknown_ingredient_policy, b.unknown_ingredient_policy);
    }
}
