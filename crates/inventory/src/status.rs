use serde::{Deserialize, Serialize};

/// Display band for an available quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Out,
    Low,
    Medium,
    High,
}

impl StockStatus {
    pub fn of(available: u32) -> Self {
        match available {
            0 => StockStatus::Out,
            1..=3 => StockStatus::Low,
            4..=10 => StockStatus::Medium,
            _ => StockStatus::High,
        }
    }

    /// Whether the size can still be added to a cart.
    pub fn purchasable(&self) -> bool {
        !matches!(self, StockStatus::Out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands() {
        assert_eq!(StockStatus::of(0), StockStatus::Out);
        assert_eq!(StockStatus::of(3), StockStatus::Low);
        assert_eq!(StockStatus::of(4), StockStatus::Medium);
        assert_eq!(StockStatus::of(10), StockStatus::Medium);
        assert_eq!(StockStatus::of(11), StockStatus::High);
        assert!(!StockStatus::Out.purchasable());
    }
}
