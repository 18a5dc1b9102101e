use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use storefront_forecast::ForecastError;
use storefront_infra::ContextError;
use storefront_inventory::StockError;

pub fn context_error_to_response(err: ContextError) -> axum::response::Response {
    match err {
        ContextError::Stock(e) => stock_error_to_response(e),
        ContextError::Records(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "record_log_error", e.to_string())
        }
        ContextError::Poisoned => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "inventory state unavailable",
        ),
    }
}

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    match &err {
        StockError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", err.to_string())
        }
        StockError::UnknownProductOrSize(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        StockError::InvalidQuantity(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", err.to_string())
        }
    }
}

pub fn forecast_error_to_response(err: ForecastError) -> axum::response::Response {
    match err {
        ForecastError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_forecast_input", msg),
    }
}

pub fn not_found(message: impl Into<String>) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
