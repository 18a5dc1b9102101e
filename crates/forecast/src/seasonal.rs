use chrono::{Datelike, NaiveDate};

use crate::error::ForecastError;

/// Month-indexed demand multipliers (January first).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonalCalendar {
    factors: [f64; 12],
}

impl SeasonalCalendar {
    /// Holiday-weighted factors used by the storefront.
    pub const STOREFRONT: [f64; 12] = [1.0, 1.4, 1.2, 1.0, 1.1, 1.0, 0.9, 0.9, 1.0, 1.1, 1.3, 1.5];

    pub fn new(factors: [f64; 12]) -> Result<Self, ForecastError> {
        if let Some(bad) = factors.iter().find(|f| !(f.is_finite() && **f >= 0.0)) {
            return Err(ForecastError::InvalidInput(format!(
                "seasonal factor must be finite and non-negative, got {bad}"
            )));
        }
        Ok(Self { factors })
    }

    /// Flat calendar (every month 1.0).
    pub fn flat() -> Self {
        Self { factors: [1.0; 12] }
    }

    pub fn factor_for(&self, date: NaiveDate) -> f64 {
        self.factors[date.month0() as usize]
    }
}

impl Default for SeasonalCalendar {
    fn default() -> Self {
        Self {
            factors: Self::STOREFRONT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_are_indexed_by_month() {
        let cal = SeasonalCalendar::default();
        let jan = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let feb = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(cal.factor_for(jan), 1.0);
        assert_eq!(cal.factor_for(feb), 1.4);
        assert_eq!(cal.factor_for(dec), 1.5);
    }

    #[test]
    fn rejects_negative_or_nan_factors() {
        let mut factors = [1.0; 12];
        factors[3] = -0.5;
        assert!(SeasonalCalendar::new(factors).is_err());
        factors[3] = f64::NAN;
        assert!(SeasonalCalendar::new(factors).is_err());
    }
}
