use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{Money, ProductId, SizeLabel};
use storefront_forecast::ReorderSuggestion;

/// A size with no units available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStockItem {
    pub product: ProductId,
    pub size: SizeLabel,
    pub name: String,
}

/// A size with available units at or below the product's minimum level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockItem {
    pub product: ProductId,
    pub size: SizeLabel,
    pub name: String,
    pub available: u32,
    pub min_level: u32,
}

/// Point-in-time stock valuation and replenishment overview.
///
/// Valuation uses available units (stock minus reserved) at the size's
/// retail price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub total_products: usize,
    pub low_stock_items: Vec<LowStockItem>,
    pub out_of_stock_items: Vec<OutOfStockItem>,
    pub reorder_suggestions: Vec<ReorderSuggestion>,
    pub total_value: Money,
}
