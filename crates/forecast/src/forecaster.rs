use chrono::NaiveDate;

use storefront_core::{ProductId, SizeLabel};

use crate::error::ForecastError;
use crate::history::HistoricalSales;
use crate::reorder::{ReorderInputs, ReorderSuggestion, SAFETY_FACTOR, Urgency};
use crate::seasonal::SeasonalCalendar;

/// Days per period of the historical series (series are monthly).
const DAYS_PER_PERIOD: f64 = 30.0;

/// Longest horizon accepted from callers.
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Reject horizons the model has no business projecting.
pub fn validate_horizon(days: u32) -> Result<u32, ForecastError> {
    match days {
        0 => Err(ForecastError::InvalidInput("horizon must be at least one day".to_string())),
        d if d > MAX_HORIZON_DAYS => Err(ForecastError::InvalidInput(format!(
            "horizon must not exceed {MAX_HORIZON_DAYS} days"
        ))),
        d => Ok(d),
    }
}

/// Short-horizon demand projection from a fixed sales history.
///
/// Model:
/// - mean of the monthly series
/// - plus the least-squares slope over period index 1..n
/// - times the seasonal factor of the forecast month
/// - scaled from monthly to daily, times the horizon, rounded up
#[derive(Debug, Clone, Default)]
pub struct DemandForecaster {
    history: HistoricalSales,
    calendar: SeasonalCalendar,
}

impl DemandForecaster {
    pub fn new(history: HistoricalSales, calendar: SeasonalCalendar) -> Self {
        Self { history, calendar }
    }

    pub fn history(&self) -> &HistoricalSales {
        &self.history
    }

    pub fn calendar(&self) -> &SeasonalCalendar {
        &self.calendar
    }

    /// Units expected to sell over the next `horizon_days`, as of `on`.
    pub fn predict_demand(&self, product: &ProductId, size: &SizeLabel, horizon_days: u32, on: NaiveDate) -> u32 {
        let series = self.history.series(product, size);
        let monthly = mean(series) + linear_trend(series);
        let daily = monthly * self.calendar.factor_for(on) / DAYS_PER_PERIOD;
        ceil_non_negative(daily * f64::from(horizon_days))
    }

    /// `ceil((max - stock) + 1.2 * lead-time demand)`, floored at zero.
    pub fn suggest_reorder_quantity(&self, inputs: &ReorderInputs, on: NaiveDate) -> u32 {
        let lead_time_demand = self.predict_demand(&inputs.product, &inputs.size, inputs.lead_time_days, on);
        let gap = f64::from(inputs.max_stock) - f64::from(inputs.current_stock);
        ceil_non_negative(gap + f64::from(lead_time_demand) * SAFETY_FACTOR)
    }

    pub fn suggest_reorder(&self, inputs: &ReorderInputs, on: NaiveDate) -> ReorderSuggestion {
        let suggested_quantity = self.suggest_reorder_quantity(inputs, on);
        let urgency = if inputs.current_stock <= inputs.min_stock {
            Urgency::High
        } else {
            Urgency::Medium
        };

        ReorderSuggestion {
            product: inputs.product.clone(),
            size: inputs.size.clone(),
            current_stock: inputs.current_stock,
            suggested_quantity,
            estimated_cost: inputs.cost_price.times(u64::from(suggested_quantity)),
            lead_time_days: inputs.lead_time_days,
            supplier: inputs.supplier.clone(),
            urgency,
        }
    }
}

fn ceil_non_negative(x: f64) -> u32 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast.
    x.ceil() as u32
}

pub fn mean(xs: &[u32]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().map(|x| f64::from(*x)).sum::<f64>() / (xs.len() as f64)
}

/// Least-squares slope of the series against index 1..n (0 for n < 2).
pub fn linear_trend(xs: &[u32]) -> f64 {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return 0.0;
    }

    let sum_x = n * (n + 1.0) / 2.0;
    let sum_xx = n * (n + 1.0) * (2.0 * n + 1.0) / 6.0;
    let sum_y: f64 = xs.iter().map(|y| f64::from(*y)).sum();
    let sum_xy: f64 = xs
        .iter()
        .enumerate()
        .map(|(i, y)| (i as f64 + 1.0) * f64::from(*y))
        .sum();

    (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Money;

    const SERIES_50ML: [u32; 12] = [10, 12, 11, 15, 16, 14, 12, 10, 15, 17, 18, 16];

    fn pid() -> ProductId {
        ProductId::new("gabrielle-essence").unwrap()
    }

    fn ml50() -> SizeLabel {
        SizeLabel::new("50ml").unwrap()
    }

    fn forecaster() -> DemandForecaster {
        let mut history = HistoricalSales::new();
        history.record(pid(), ml50(), SERIES_50ML.to_vec()).unwrap();
        DemandForecaster::new(history, SeasonalCalendar::default())
    }

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, 15).unwrap()
    }

    fn inputs(current_stock: u32) -> ReorderInputs {
        ReorderInputs {
            product: pid(),
            size: ml50(),
            current_stock,
            min_stock: 5,
            max_stock: 50,
            lead_time_days: 14,
            cost_price: Money::from_cents(7500),
            supplier: "Luxury Fragrances Inc".to_string(),
        }
    }

    #[test]
    fn trend_matches_least_squares_slope() {
        // (12*1150 - 78*166) / (12*650 - 78^2) = 852 / 1716
        let slope = linear_trend(&SERIES_50ML);
        assert!((slope - 852.0 / 1716.0).abs() < 1e-12);
        assert_eq!(linear_trend(&[7]), 0.0);
        assert_eq!(linear_trend(&[5, 5, 5, 5, 5]), 0.0);
    }

    #[test]
    fn predict_demand_is_deterministic_per_month() {
        let f = forecaster();
        // (166/12 + 852/1716) / 30 * 14 ≈ 6.687 in January
        assert_eq!(f.predict_demand(&pid(), &ml50(), 14, date(1)), 7);
        // x1.5 in December ≈ 10.03
        assert_eq!(f.predict_demand(&pid(), &ml50(), 14, date(12)), 11);
        assert_eq!(f.predict_demand(&pid(), &ml50(), 0, date(12)), 0);
    }

    #[test]
    fn unknown_sizes_use_default_series() {
        let f = forecaster();
        let other = SizeLabel::new("10ml").unwrap();
        // 5/30 * 7 ≈ 1.17
        assert_eq!(f.predict_demand(&pid(), &other, 7, date(1)), 2);
    }

    #[test]
    fn declining_series_never_goes_negative() {
        let mut history = HistoricalSales::new();
        history.record(pid(), ml50(), vec![10, 0]).unwrap();
        let f = DemandForecaster::new(history, SeasonalCalendar::flat());
        assert_eq!(f.predict_demand(&pid(), &ml50(), 30, date(3)), 0);
    }

    #[test]
    fn reorder_tops_up_to_max_plus_safety_stock() {
        let f = forecaster();
        // (50 - 8) + 1.2 * 7 = 50.4 -> 51
        let suggestion = f.suggest_reorder(&inputs(8), date(1));
        assert_eq!(suggestion.suggested_quantity, 51);
        assert_eq!(suggestion.estimated_cost, Money::from_cents(7500 * 51));
        assert_eq!(suggestion.urgency, Urgency::Medium);

        let critical = f.suggest_reorder(&inputs(3), date(1));
        assert_eq!(critical.urgency, Urgency::High);
        assert_eq!(critical.suggested_quantity, 56);
    }

    #[test]
    fn overstocked_products_suggest_zero() {
        let f = forecaster();
        assert_eq!(f.suggest_reorder_quantity(&inputs(200), date(1)), 0);
    }

    #[test]
    fn horizon_bounds() {
        assert!(validate_horizon(0).is_err());
        assert_eq!(validate_horizon(30), Ok(30));
        assert_eq!(validate_horizon(MAX_HORIZON_DAYS), Ok(MAX_HORIZON_DAYS));
        assert!(matches!(validate_horizon(400), Err(ForecastError::InvalidInput(_))));
    }
}
