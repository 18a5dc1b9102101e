use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use storefront_core::{AlertId, Entity};

use crate::app::routes::common::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_alerts))
        .route("/:id/resolve", post(resolve_alert))
}

/// `?unresolved=true` hides resolved alerts.
pub async fn list_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AlertsQuery>,
) -> axum::response::Response {
    let ctx = services.ctx();
    let alerts = match ctx.alerts(query.unresolved) {
        Ok(a) => a,
        Err(e) => return errors::context_error_to_response(e),
    };
    let names: HashMap<_, _> = match ctx.products() {
        Ok(products) => products
            .iter()
            .map(|p| (p.id().clone(), p.name().to_string()))
            .collect(),
        Err(e) => return errors::context_error_to_response(e),
    };

    let body: Vec<_> = alerts
        .iter()
        .map(|a| dto::alert_to_json(a, names.get(&a.product).map(String::as_str)))
        .collect();
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn resolve_alert(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: AlertId = match parse_id(&id, "alert") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ctx().resolve_alert(id, Utc::now()) {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id, "resolved": true })),
        )
            .into_response(),
        Ok(false) => errors::not_found("alert not found"),
        Err(e) => errors::context_error_to_response(e),
    }
}
