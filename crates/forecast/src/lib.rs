//! `storefront-forecast`
//!
//! **Responsibility:** demand forecasting and reorder sizing.
//!
//! This crate is intentionally **not** part of the inventory model:
//! - It must not depend on inventory types; callers hand it plain inputs.
//! - It must not mutate stock. Suggestions are advisory values.

pub mod error;
pub mod forecaster;
pub mod history;
pub mod reorder;
pub mod seasonal;

pub use error::ForecastError;
pub use forecaster::{DemandForecaster, MAX_HORIZON_DAYS, linear_trend, mean, validate_horizon};
pub use history::{DEFAULT_SERIES, HistoricalSales};
pub use reorder::{ReorderInputs, ReorderSuggestion, SAFETY_FACTOR, Urgency};
pub use seasonal::SeasonalCalendar;
