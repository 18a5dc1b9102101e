use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/inventory", get(inventory_report))
}

pub async fn inventory_report(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ctx().report(Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}

/// Persisted stock adjustments, oldest first.
pub async fn list_transactions(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.ctx().transactions() {
        Ok(txs) => (
            StatusCode::OK,
            Json(txs.iter().map(dto::transaction_to_json).collect::<Vec<_>>()),
        )
            .into_response(),
        Err(e) => errors::context_error_to_response(e),
    }
}
