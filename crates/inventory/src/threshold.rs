use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::alert::AlertKind;
use crate::product::{StockKey, StockLevels};

/// Stock level band relative to a product's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    Healthy,
    ReorderNeeded,
    CriticalLow,
}

impl StockLevel {
    pub fn classify(stock: u32, levels: StockLevels) -> Self {
        if stock <= levels.min_stock {
            StockLevel::CriticalLow
        } else if stock <= levels.reorder_point {
            StockLevel::ReorderNeeded
        } else {
            StockLevel::Healthy
        }
    }

    pub fn alert_kind(&self) -> Option<AlertKind> {
        match self {
            StockLevel::Healthy => None,
            StockLevel::ReorderNeeded => Some(AlertKind::ReorderNeeded),
            StockLevel::CriticalLow => Some(AlertKind::CriticalLow),
        }
    }
}

/// What triggered a threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// A ledger mutation (or an explicit check). Always reports a breach.
    Mutation,
    /// The periodic drift sweep. Reports a breach only when the band changed
    /// since the last time this key was observed.
    Sweep,
}

/// Compares stock against thresholds and decides whether to alert.
///
/// Remembers the last observed band per key so the periodic sweep does not
/// repeat an alert that the triggering mutation already raised.
#[derive(Debug, Clone, Default)]
pub struct ThresholdMonitor {
    last_seen: HashMap<StockKey, StockLevel>,
}

impl ThresholdMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the alert kind to raise, if any.
    pub fn check(&mut self, key: &StockKey, stock: u32, levels: StockLevels, trigger: CheckTrigger) -> Option<AlertKind> {
        let level = StockLevel::classify(stock, levels);
        let previous = self.last_seen.insert(key.clone(), level);

        match trigger {
            CheckTrigger::Mutation => level.alert_kind(),
            CheckTrigger::Sweep if previous == Some(level) => None,
            CheckTrigger::Sweep => level.alert_kind(),
        }
    }

    pub fn last_seen(&self, key: &StockKey) -> Option<StockLevel> {
        self.last_seen.get(key).copied()
    }
}
