use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{ProductId, SizeLabel, TransactionId};

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Add,
    Subtract,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Add => "add",
            Direction::Subtract => "subtract",
        }
    }
}

impl core::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Direction::Add),
            "subtract" => Ok(Direction::Subtract),
            other => Err(format!("unknown direction '{other}' (expected add or subtract)")),
        }
    }
}

/// Actor recorded on transactions made by the inventory itself.
pub const SYSTEM_ACTOR: &str = "system";

/// Log entry for an applied stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub id: TransactionId,
    pub product: ProductId,
    pub size: SizeLabel,
    pub quantity: u32,
    pub direction: Direction,
    pub occurred_at: DateTime<Utc>,
    pub actor: String,
}
