//! Static seed data loaded at startup.

use storefront_core::{DomainResult, Money, ProductId, SizeLabel};
use storefront_forecast::{ForecastError, HistoricalSales};

use crate::ledger::StockLedger;
use crate::product::{NewProduct, Product, SizeStock, StockLevels};

pub const GABRIELLE_ESSENCE: &str = "gabrielle-essence";

/// The storefront's one-product catalog.
pub fn storefront_catalog() -> DomainResult<StockLedger> {
    let size = |label: &str, stock, reserved, price_cents| -> DomainResult<(SizeLabel, SizeStock)> {
        Ok((SizeLabel::new(label)?, SizeStock::new(stock, reserved, Money::from_cents(price_cents))?))
    };

    let gabrielle = Product::create(NewProduct {
        id: ProductId::new(GABRIELLE_ESSENCE)?,
        name: "Gabrielle Essence Eau De Parfum".to_string(),
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
        sizes: vec![
            size("30ml", 15, 2, 9999)?,
            size("50ml", 8, 1, 14999)?,
            size("100ml", 3, 0, 19999)?,
        ],
    })?;

    StockLedger::from_products([gabrielle])
}

/// Last twelve monthly sales periods per size.
pub fn storefront_sales_history() -> Result<HistoricalSales, ForecastError> {
    let id = |s: &str| ProductId::new(s).map_err(|e| ForecastError::InvalidInput(e.to_string()));
    let ml = |s: &str| SizeLabel::new(s).map_err(|e| ForecastError::InvalidInput(e.to_string()));

    let mut history = HistoricalSales::new();
    history.record(id(GABRIELLE_ESSENCE)?, ml("30ml")?, vec![5, 7, 6, 8, 9, 7, 6, 5, 8, 9, 10, 8])?;
    history.record(id(GABRIELLE_ESSENCE)?, ml("50ml")?, vec![10, 12, 11, 15, 16, 14, 12, 10, 15, 17, 18, 16])?;
    history.record(id(GABRIELLE_ESSENCE)?, ml("100ml")?, vec![3, 4, 3, 5, 6, 5, 4, 3, 5, 6, 7, 5])?;
    Ok(history)
}
