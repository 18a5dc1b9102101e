use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

use storefront_core::{DomainError, Entity, ProductId, SizeLabel, TransactionId};

use crate::product::{Product, SizeStock, StockKey};
use crate::transaction::{Direction, InventoryTransaction, SYSTEM_ACTOR};

/// Why a stock operation was refused.
///
/// None of these are fatal: callers that only care about success use
/// `.is_ok()`, the storefront keeps running either way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("unknown product or size: {0}")]
    UnknownProductOrSize(StockKey),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),
}

/// Per-product, per-size stock and reserved counts.
///
/// Pure state: no clocks, no IO. Every mutation preserves
/// `reserved <= stock`.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    products: BTreeMap<ProductId, Product>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Result<Self, DomainError> {
        let mut ledger = Self::new();
        for p in products {
            ledger.insert(p)?;
        }
        Ok(ledger)
    }

    /// Register a product. Products are never removed.
    pub fn insert(&mut self, product: Product) -> Result<(), DomainError> {
        if self.products.contains_key(product.id()) {
            return Err(DomainError::validation(format!(
                "product '{}' already loaded",
                product.id()
            )));
        }
        self.products.insert(product.id().clone(), product);
        Ok(())
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Every (product, size) slot in deterministic order.
    pub fn keys(&self) -> Vec<StockKey> {
        self.products
            .values()
            .flat_map(|p| p.sizes().map(|(size, _)| StockKey::new(p.id().clone(), size.clone())))
            .collect()
    }

    pub fn size_stock(&self, product: &ProductId, size: &SizeLabel) -> Option<&SizeStock> {
        self.products.get(product).and_then(|p| p.size(size))
    }

    /// Stock minus reserved; 0 for unknown products or sizes.
    pub fn get_available(&self, product: &ProductId, size: &SizeLabel) -> u32 {
        self.size_stock(product, size).map(SizeStock::available).unwrap_or(0)
    }

    fn slot_mut(&mut self, product: &ProductId, size: &SizeLabel) -> Result<&mut SizeStock, StockError> {
        self.products
            .get_mut(product)
            .and_then(|p| p.size_mut(size))
            .ok_or_else(|| StockError::UnknownProductOrSize(StockKey::new(product.clone(), size.clone())))
    }

    /// Add or remove units of stock.
    ///
    /// A decrement may only consume unreserved units; anything more is
    /// refused and leaves the slot untouched.
    pub fn adjust(
        &mut self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        direction: Direction,
        occurred_at: DateTime<Utc>,
    ) -> Result<InventoryTransaction, StockError> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity("quantity cannot be zero".to_string()));
        }

        let slot = self.slot_mut(product, size)?;
        let new_stock = match direction {
            Direction::Add => slot
                .stock()
                .checked_add(quantity)
                .ok_or_else(|| StockError::InvalidQuantity("stock would overflow".to_string()))?,
            Direction::Subtract => {
                let available = slot.available();
                if quantity > available {
                    return Err(StockError::InsufficientStock {
                        requested: quantity,
                        available,
                    });
                }
                slot.stock() - quantity
            }
        };
        slot.set_stock(new_stock);

        Ok(InventoryTransaction {
            id: TransactionId::new(),
            product: product.clone(),
            size: size.clone(),
            quantity,
            direction,
            occurred_at,
            actor: SYSTEM_ACTOR.to_string(),
        })
    }

    /// Move `quantity` units from available to reserved.
    pub fn hold(&mut self, product: &ProductId, size: &SizeLabel, quantity: u32) -> Result<(), StockError> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity("quantity cannot be zero".to_string()));
        }
        let slot = self.slot_mut(product, size)?;
        let available = slot.available();
        if quantity > available {
            return Err(StockError::InsufficientStock {
                requested: quantity,
                available,
            });
        }
        slot.set_reserved(slot.reserved() + quantity);
        Ok(())
    }

    /// Return up to `quantity` reserved units to the pool, floored at zero.
    ///
    /// Returns how many units were actually released, so double and
    /// over-release are harmless.
    pub fn release(&mut self, product: &ProductId, size: &SizeLabel, quantity: u32) -> Result<u32, StockError> {
        let slot = self.slot_mut(product, size)?;
        let released = quantity.min(slot.reserved());
        slot.set_reserved(slot.reserved() - released);
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{NewProduct, StockLevels};
    use proptest::prelude::*;
    use storefront_core::Money;

    fn pid() -> ProductId {
        ProductId::new("gabrielle-essence").unwrap()
    }

    fn ml(label: &str) -> SizeLabel {
        SizeLabel::new(label).unwrap()
    }

    fn ledger_with(stock: u32, reserved: u32) -> StockLedger {
        let product = Product::create(NewProduct {
            id: pid(),
            name: "Gabrielle Essence".to_string(),
            brand: "Chanel".to_string(),
            sku: "CHN-GAB-50ML".to_string(),
            category: "luxury-perfume".to_string(),
            cost_price: Money::from_cents(7500),
            levels: StockLevels {
                min_stock: 5,
                max_stock: 50,
                reorder_point: 10,
            },
            supplier: "Luxury Fragrances Inc".to_string(),
            lead_time_days: 14,
            seasonal_multiplier: 1.2,
            sizes: vec![(ml("50ml"), SizeStock::new(stock, reserved, Money::from_cents(14999)).unwrap())],
        })
        .unwrap();
        StockLedger::from_products([product]).unwrap()
    }

    #[test]
    fn available_for_unknown_keys_is_zero() {
        let ledger = ledger_with(8, 1);
        assert_eq!(ledger.get_available(&pid(), &ml("50ml")), 7);
        assert_eq!(ledger.get_available(&pid(), &ml("75ml")), 0);
        assert_eq!(ledger.get_available(&ProductId::new("nope").unwrap(), &ml("50ml")), 0);
    }

    #[test]
    fn subtract_beyond_stock_fails_and_leaves_stock() {
        let mut ledger = ledger_with(3, 0);
        let err = ledger
            .adjust(&pid(), &ml("50ml"), 5, Direction::Subtract, Utc::now())
            .unwrap_err();
        assert_eq!(err, StockError::InsufficientStock { requested: 5, available: 3 });
        assert_eq!(ledger.size_stock(&pid(), &ml("50ml")).unwrap().stock(), 3);
    }

    #[test]
    fn subtract_cannot_eat_into_reserved_units() {
        let mut ledger = ledger_with(8, 6);
        assert!(ledger.adjust(&pid(), &ml("50ml"), 3, Direction::Subtract, Utc::now()).is_err());
        assert!(ledger.adjust(&pid(), &ml("50ml"), 2, Direction::Subtract, Utc::now()).is_ok());
        let slot = ledger.size_stock(&pid(), &ml("50ml")).unwrap();
        assert_eq!((slot.stock(), slot.reserved()), (6, 6));
    }

    #[test]
    fn adjust_records_a_transaction() {
        let mut ledger = ledger_with(8, 1);
        let at = Utc::now();
        let tx = ledger.adjust(&pid(), &ml("50ml"), 4, Direction::Add, at).unwrap();
        assert_eq!(tx.quantity, 4);
        assert_eq!(tx.direction, Direction::Add);
        assert_eq!(tx.occurred_at, at);
        assert_eq!(tx.actor, "system");
        assert_eq!(ledger.size_stock(&pid(), &ml("50ml")).unwrap().stock(), 12);
    }

    #[test]
    fn zero_quantity_and_unknown_keys_are_rejected() {
        let mut ledger = ledger_with(8, 1);
        assert!(matches!(
            ledger.adjust(&pid(), &ml("50ml"), 0, Direction::Add, Utc::now()),
            Err(StockError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ledger.hold(&pid(), &ml("10ml"), 1),
            Err(StockError::UnknownProductOrSize(_))
        ));
    }

    #[test]
    fn release_is_floored_at_zero() {
        let mut ledger = ledger_with(8, 1);
        ledger.hold(&pid(), &ml("50ml"), 2).unwrap();
        assert_eq!(ledger.release(&pid(), &ml("50ml"), 2).unwrap(), 2);
        assert_eq!(ledger.release(&pid(), &ml("50ml"), 2).unwrap(), 1);
        assert_eq!(ledger.release(&pid(), &ml("50ml"), 2).unwrap(), 0);
        assert_eq!(ledger.size_stock(&pid(), &ml("50ml")).unwrap().reserved(), 0);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Hold(u32),
        Release(u32),
        Add(u32),
        Subtract(u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..20).prop_map(Op::Hold),
            (0u32..20).prop_map(Op::Release),
            (0u32..20).prop_map(Op::Add),
            (0u32..20).prop_map(Op::Subtract),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: reserved <= stock after any operation sequence.
        #[test]
        fn reserved_never_exceeds_stock(
            start in 0u32..30,
            ops in prop::collection::vec(op(), 0..40)
        ) {
            let mut ledger = ledger_with(start, 0);
            for op in ops {
                let _ = match op {
                    Op::Hold(q) => ledger.hold(&pid(), &ml("50ml"), q).map(|_| ()),
                    Op::Release(q) => ledger.release(&pid(), &ml("50ml"), q).map(|_| ()),
                    Op::Add(q) => ledger.adjust(&pid(), &ml("50ml"), q, Direction::Add, Utc::now()).map(|_| ()),
                    Op::Subtract(q) => ledger.adjust(&pid(), &ml("50ml"), q, Direction::Subtract, Utc::now()).map(|_| ()),
                };
                let slot = ledger.size_stock(&pid(), &ml("50ml")).unwrap();
                prop_assert!(slot.reserved() <= slot.stock());
                prop_assert_eq!(slot.available(), slot.stock() - slot.reserved());
            }
        }

        /// Property: hold succeeds iff quantity <= available, and a matching
        /// release restores availability exactly.
        #[test]
        fn hold_then_release_restores_available(
            stock in 0u32..30,
            reserved_frac in 0u32..=100,
            quantity in 1u32..40
        ) {
            let reserved = stock * reserved_frac / 100;
            let mut ledger = ledger_with(stock, reserved);
            let before = ledger.get_available(&pid(), &ml("50ml"));

            let result = ledger.hold(&pid(), &ml("50ml"), quantity);
            prop_assert_eq!(result.is_ok(), quantity <= before);

            if result.is_ok() {
                prop_assert_eq!(ledger.get_available(&pid(), &ml("50ml")), before - quantity);
                ledger.release(&pid(), &ml("50ml"), quantity).unwrap();
                prop_assert_eq!(ledger.get_available(&pid(), &ml("50ml")), before);
            } else {
                prop_assert_eq!(ledger.get_available(&pid(), &ml("50ml")), before);
            }
        }
    }
}
