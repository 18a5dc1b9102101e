use serde::{Deserialize, Serialize};

use storefront_core::{Money, ProductId, SizeLabel};

/// Multiplier applied to lead-time demand as safety stock.
pub const SAFETY_FACTOR: f64 = 1.2;

/// Snapshot of the product fields a reorder suggestion needs.
///
/// Callers build this from their own catalog model; this crate never sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderInputs {
    pub product: ProductId,
    pub size: SizeLabel,
    pub current_stock: u32,
    pub min_stock: u32,
    pub max_stock: u32,
    pub lead_time_days: u32,
    pub cost_price: Money,
    pub supplier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
}

/// Advisory reorder. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub product: ProductId,
    pub size: SizeLabel,
    pub current_stock: u32,
    pub suggested_quantity: u32,
    pub estimated_cost: Money,
    pub lead_time_days: u32,
    pub supplier: String,
    pub urgency: Urgency,
}
