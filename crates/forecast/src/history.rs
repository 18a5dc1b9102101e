use std::collections::HashMap;

use storefront_core::{ProductId, SizeLabel};

use crate::error::ForecastError;

/// Series used when no sales history exists for a product size.
pub const DEFAULT_SERIES: [u32; 5] = [5, 5, 5, 5, 5];

/// Per-period (monthly) unit sales, oldest first.
#[derive(Debug, Clone, Default)]
pub struct HistoricalSales {
    series: HashMap<(ProductId, SizeLabel), Vec<u32>>,
}

impl HistoricalSales {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sales series for a product size, replacing any previous one.
    pub fn record(&mut self, product: ProductId, size: SizeLabel, series: Vec<u32>) -> Result<(), ForecastError> {
        if series.is_empty() {
            return Err(ForecastError::InvalidInput(format!(
                "empty sales series for {product}/{size}"
            )));
        }
        self.series.insert((product, size), series);
        Ok(())
    }

    /// The recorded series, or [`DEFAULT_SERIES`] when none exists.
    pub fn series(&self, product: &ProductId, size: &SizeLabel) -> &[u32] {
        self.series
            .get(&(product.clone(), size.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&DEFAULT_SERIES)
    }
}
