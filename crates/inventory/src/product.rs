use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, Money, ProductId, SizeLabel};

/// Address of one stock slot: a product in a given size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product: ProductId,
    pub size: SizeLabel,
}

impl StockKey {
    pub fn new(product: ProductId, size: SizeLabel) -> Self {
        Self { product, size }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.product, self.size)
    }
}

/// Stock counters for a single size.
///
/// Invariant: `reserved <= stock`, so `available()` never underflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    stock: u32,
    reserved: u32,
    unit_price: Money,
}

impl SizeStock {
    pub fn new(stock: u32, reserved: u32, unit_price: Money) -> DomainResult<Self> {
        if reserved > stock {
            return Err(DomainError::invariant(format!(
                "reserved ({reserved}) cannot exceed stock ({stock})"
            )));
        }
        Ok(Self {
            stock,
            reserved,
            unit_price,
        })
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Units that can still be sold or reserved.
    pub fn available(&self) -> u32 {
        self.stock - self.reserved
    }

    pub(crate) fn set_stock(&mut self, stock: u32) {
        debug_assert!(stock >= self.reserved);
        self.stock = stock;
    }

    pub(crate) fn set_reserved(&mut self, reserved: u32) {
        debug_assert!(reserved <= self.stock);
        self.reserved = reserved;
    }
}

/// Replenishment thresholds shared by every size of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevels {
    /// At or below this, stock is critically low.
    pub min_stock: u32,
    /// Target level a reorder tops stock back up to.
    pub max_stock: u32,
    /// At or below this, a reorder is needed.
    pub reorder_point: u32,
}

impl StockLevels {
    fn validate(&self) -> DomainResult<()> {
        if self.min_stock > self.reorder_point {
            return Err(DomainError::validation(
                "min_stock must not exceed reorder_point",
            ));
        }
        if self.reorder_point > self.max_stock {
            return Err(DomainError::validation(
                "reorder_point must not exceed max_stock",
            ));
        }
        Ok(())
    }
}

/// Input for [`Product::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub sku: String,
    pub category: String,
    pub cost_price: Money,
    pub levels: StockLevels,
    pub supplier: String,
    pub lead_time_days: u32,
    pub seasonal_multiplier: f64,
    pub sizes: Vec<(SizeLabel, SizeStock)>,
}

/// A catalog product and its per-size stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    brand: String,
    sku: String,
    category: String,
    cost_price: Money,
    levels: StockLevels,
    supplier: String,
    lead_time_days: u32,
    seasonal_multiplier: f64,
    sizes: BTreeMap<SizeLabel, SizeStock>,
}

impl Product {
    pub fn create(input: NewProduct) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if input.sizes.is_empty() {
            return Err(DomainError::validation("a product needs at least one size"));
        }
        if !(input.seasonal_multiplier.is_finite() && input.seasonal_multiplier > 0.0) {
            return Err(DomainError::validation(
                "seasonal_multiplier must be a finite positive number",
            ));
        }
        input.levels.validate()?;

        let mut sizes = BTreeMap::new();
        for (label, stock) in input.sizes {
            if sizes.insert(label.clone(), stock).is_some() {
                return Err(DomainError::validation(format!("duplicate size '{label}'")));
            }
        }

        Ok(Self {
            id: input.id,
            name: input.name,
            brand: input.brand,
            sku: input.sku,
            category: input.category,
            cost_price: input.cost_price,
            levels: input.levels,
            supplier: input.supplier,
            lead_time_days: input.lead_time_days,
            seasonal_multiplier: input.seasonal_multiplier,
            sizes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn cost_price(&self) -> Money {
        self.cost_price
    }

    pub fn levels(&self) -> StockLevels {
        self.levels
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn lead_time_days(&self) -> u32 {
        self.lead_time_days
    }

    pub fn seasonal_multiplier(&self) -> f64 {
        self.seasonal_multiplier
    }

    pub fn size(&self, size: &SizeLabel) -> Option<&SizeStock> {
        self.sizes.get(size)
    }

    pub(crate) fn size_mut(&mut self, size: &SizeLabel) -> Option<&mut SizeStock> {
        self.sizes.get_mut(size)
    }

    /// Sizes in label order.
    pub fn sizes(&self) -> impl Iterator<Item = (&SizeLabel, &SizeStock)> {
        self.sizes.iter()
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
