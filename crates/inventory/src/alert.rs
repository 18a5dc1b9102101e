use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AlertId, ProductId, SizeLabel};

/// Why an alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    /// Stock at or below the product's minimum level.
    CriticalLow,
    /// Stock at or below the reorder point.
    ReorderNeeded,
    /// A decrement asked for more than was available.
    InsufficientStock,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::CriticalLow => "critical-low",
            AlertKind::ReorderNeeded => "reorder-needed",
            AlertKind::InsufficientStock => "insufficient-stock",
        }
    }

    /// Short headline for rendering.
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::CriticalLow => "Critical Stock Level",
            AlertKind::ReorderNeeded => "Reorder Required",
            AlertKind::InsufficientStock => "Insufficient Stock",
        }
    }
}

/// A raised stock alert. Only `resolved` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub id: AlertId,
    pub product: ProductId,
    pub size: SizeLabel,
    pub kind: AlertKind,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

impl StockAlert {
    pub fn new(product: ProductId, size: SizeLabel, kind: AlertKind, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AlertId::new(),
            product,
            size,
            kind,
            created_at,
            resolved: false,
        }
    }

    /// Human-readable message; `product_name` falls back to the id when unknown.
    pub fn message(&self, product_name: Option<&str>) -> String {
        let name = product_name.unwrap_or(self.product.as_str());
        match self.kind {
            AlertKind::CriticalLow => format!("{name} ({}) is critically low in stock", self.size),
            AlertKind::ReorderNeeded => format!("Time to reorder {name} ({})", self.size),
            AlertKind::InsufficientStock => {
                format!("Cannot fulfill order: insufficient {name} ({}) stock", self.size)
            }
        }
    }
}

/// Append-only alert log (no deduplication, no deletion).
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: Vec<StockAlert>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, alert: StockAlert) {
        self.alerts.push(alert);
    }

    /// Mark an alert resolved. Returns `false` for unknown ids.
    pub fn resolve(&mut self, id: AlertId) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.resolved = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: AlertId) -> Option<&StockAlert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    /// All alerts in creation order.
    pub fn all(&self) -> &[StockAlert] {
        &self.alerts
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &StockAlert> {
        self.alerts.iter().filter(|a| !a.resolved)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
