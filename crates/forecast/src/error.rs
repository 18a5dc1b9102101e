use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("invalid forecast input: {0}")]
    InvalidInput(String),
}
