use axum::{Router, routing::get};

pub mod alerts;
pub mod common;
pub mod inventory;
pub mod reports;
pub mod reservations;
pub mod system;

/// Router for every inventory endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/events", get(system::stream))
        .route("/transactions", get(reports::list_transactions))
        .nest("/inventory", inventory::router())
        .nest("/reservations", reservations::router())
        .nest("/alerts", alerts::router())
        .nest("/reports", reports::router())
}
