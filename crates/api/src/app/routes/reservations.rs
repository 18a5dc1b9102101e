use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use storefront_core::ReservationId;

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_reservation))
        .route("/:id/confirm", post(confirm_reservation))
        .route("/:id/cancel", post(cancel_reservation))
}

/// Only active reservations are visible here.
pub async fn get_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReservationId = match parse_id(&id, "reservation") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ctx().reservation(id) {
        Ok(Some(r)) => (StatusCode::OK, Json(dto::reservation_to_json(&r))).into_response(),
        Ok(None) => errors::not_found("no active reservation with that id"),
        Err(e) => errors::context_error_to_response(e),
    }
}

/// Keep the hold for checkout and stop the auto-release.
pub async fn confirm_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReservationId = match parse_id(&id, "reservation") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ctx().confirm(id, Utc::now()) {
        Ok(Some(r)) => (StatusCode::OK, Json(dto::reservation_to_json(&r))).into_response(),
        Ok(None) => errors::not_found("no active reservation with that id"),
        Err(e) => errors::context_error_to_response(e),
    }
}

/// Release the hold now and stop the auto-release.
pub async fn cancel_reservation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ReservationId = match parse_id(&id, "reservation") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ctx().cancel(id, Utc::now()) {
        Ok(Some(r)) => (StatusCode::OK, Json(dto::reservation_to_json(&r))).into_response(),
        Ok(None) => errors::not_found("no active reservation with that id"),
        Err(e) => errors::context_error_to_response(e),
    }
}
