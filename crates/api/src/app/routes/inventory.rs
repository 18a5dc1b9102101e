use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use storefront_forecast::validate_horizon;

use crate::app::routes::common::parse_key;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Forecast horizon when the caller does not pass `days`.
const DEFAULT_FORECAST_DAYS: u32 = 30;

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/:product/:size", get(get_stock))
        .route("/:product/:size/adjust", post(adjust_stock))
        .route("/:product/:size/reserve", post(reserve_stock))
        .route("/:product/:size/release", post(release_stock))
        .route("/:product/:size/check", post(check_stock_levels))
        .route("/:product/:size/forecast", get(forecast_demand))
        .route("/:product/:size/reorder", get(reorder_suggestion))
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ctx().products() {
        Ok(products) => (
            StatusCode::OK,
            Json(products.iter().map(dto::product_to_json).collect::<Vec<_>>()),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let found = match services.ctx().product(&product) {
        Ok(p) => p,
        Err(e) => return errors::context_error_to_response(e),
    };

    match found.as_ref().and_then(|p| p.size(&size).map(|slot| (p, slot))) {
        Some((p, slot)) => {
            let mut body = dto::size_to_json(size.as_str(), slot);
            body["product_id"] = serde_json::json!(product);
            body["name"] = serde_json::json!(p.name());
            (StatusCode::OK, Json(body)).into_response()
        }
        None => errors::not_found(format!("unknown product or size: {product}/{size}")),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let ctx = services.ctx();
    match ctx.adjust(&product, &size, body.quantity, body.operation, Utc::now()) {
        Ok(tx) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "transaction": dto::transaction_to_json(&tx),
                "available": ctx.get_available(&product, &size).unwrap_or(0),
            })),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn reserve_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let ctx = services.ctx();
    match ctx.reserve(&product, &size, body.quantity, Utc::now()) {
        Ok(reservation) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "reservation": dto::reservation_to_json(&reservation),
                "available": ctx.get_available(&product, &size).unwrap_or(0),
            })),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn release_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
    Json(body): Json<dto::QuantityRequest>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let ctx = services.ctx();
    match ctx.release(&product, &size, body.quantity, Utc::now()) {
        Ok(released) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "released": released,
                "available": ctx.get_available(&product, &size).unwrap_or(0),
            })),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn check_stock_levels(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let ctx = services.ctx();
    match ctx.check_stock_levels(&product, &size, Utc::now()) {
        Ok(alert) => {
            let name = ctx.product(&product).ok().flatten().map(|p| p.name().to_string());
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "alert": alert.map(|a| dto::alert_to_json(&a, name.as_deref())),
                })),
            )
                .into_response()
        }
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn forecast_demand(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
    Query(query): Query<dto::ForecastQuery>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    let days = match validate_horizon(query.days.unwrap_or(DEFAULT_FORECAST_DAYS)) {
        Ok(d) => d,
        Err(e) => return errors::forecast_error_to_response(e),
    };

    match services.ctx().predict_demand(&product, &size, days, Utc::now().date_naive()) {
        Ok(demand) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "product_id": product,
                "size": size,
                "horizon_days": days,
                "predicted_demand": demand,
            })),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

pub async fn reorder_suggestion(
    Extension(services): Extension<Arc<AppServices>>,
    Path((product, size)): Path<(String, String)>,
) -> axum::response::Response {
    let (product, size) = match parse_key(&product, &size) {
        Ok(k) => k,
        Err(resp) => return resp,
    };

    match services.ctx().suggest_reorder(&product, &size, Utc::now().date_naive()) {
        Ok(Some(suggestion)) => (StatusCode::OK, Json(suggestion)).into_response(),
        Ok(None) => errors::not_found(format!("unknown product or size: {product}/{size}")),
        Err(e) => errors::context_error_to_response(e),
    }
}
