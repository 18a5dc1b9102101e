use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use storefront_forecast::{DemandForecaster, SeasonalCalendar};
use storefront_infra::InventoryContext;
use storefront_inventory::Inventory;
use storefront_inventory::seed::{storefront_catalog, storefront_sales_history};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let inventory = Inventory::new(
            storefront_catalog().unwrap(),
            DemandForecaster::new(storefront_sales_history().unwrap(), SeasonalCalendar::default()),
        );
        let ctx = Arc::new(InventoryContext::in_memory(inventory));

        // Same router as prod, bound to an ephemeral port.
        let app = storefront_api::app::build_app(ctx).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_json(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let res = client.get(url).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

async fn post_json(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let res = client.post(url).json(&body).send().await.unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_is_public_and_ok() {
    let server = TestServer::spawn().await;
    let res = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn seeded_stock_is_visible() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, server.url("/inventory/gabrielle-essence/50ml")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 8);
    assert_eq!(body["reserved"], 1);
    assert_eq!(body["available"], 7);
    assert_eq!(body["purchasable"], true);

    let (status, body) = get_json(&client, server.url("/inventory/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["sizes"].as_array().unwrap().len(), 3);

    let (status, body) = get_json(&client, server.url("/inventory/gabrielle-essence/5ml")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn reserve_confirm_and_cancel_flow() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/30ml/reserve"),
        json!({ "quantity": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // 15 stock, 2 seeded holds, 3 new
    assert_eq!(body["available"], 10);
    let first = body["reservation"]["id"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &client,
        server.url(&format!("/reservations/{first}/confirm")),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "confirmed");

    // Confirmed reservations are no longer cancellable.
    let (status, _) = post_json(
        &client,
        server.url(&format!("/reservations/{first}/cancel")),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/30ml/reserve"),
        json!({ "quantity": 4 }),
    )
    .await;
    let second = body["reservation"]["id"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &client,
        server.url(&format!("/reservations/{second}/cancel")),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "released");

    let (_, body) = get_json(&client, server.url("/inventory/gabrielle-essence/30ml")).await;
    assert_eq!(body["available"], 10);
}

#[tokio::test]
async fn over_reservation_is_a_conflict() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/100ml/reserve"),
        json!({ "quantity": 4 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_stock");
}

#[tokio::test]
async fn failed_decrement_raises_an_insufficient_stock_alert() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/100ml/adjust"),
        json!({ "quantity": 5, "operation": "subtract" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_stock");

    let (_, body) = get_json(&client, server.url("/inventory/gabrielle-essence/100ml")).await;
    assert_eq!(body["stock"], 3);

    let (status, alerts) = get_json(&client, server.url("/alerts")).await;
    assert_eq!(status, StatusCode::OK);
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["type"], "insufficient-stock");
    assert!(alerts[0]["message"].as_str().unwrap().contains("Gabrielle Essence"));

    let id = alerts[0]["id"].as_str().unwrap();
    let (status, _) = post_json(&client, server.url(&format!("/alerts/{id}/resolve")), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, unresolved) = get_json(&client, server.url("/alerts?unresolved=true")).await;
    assert!(unresolved.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adjustments_are_logged_as_transactions() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/50ml/adjust"),
        json!({ "quantity": 12, "operation": "add" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 19);
    assert_eq!(body["transaction"]["user"], "system");

    let (status, body) = post_json(
        &client,
        server.url("/inventory/gabrielle-essence/50ml/adjust"),
        json!({ "quantity": 0, "operation": "add" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_quantity");

    let (_, txs) = get_json(&client, server.url("/transactions")).await;
    let txs = txs.as_array().unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0]["quantity"], 12);
    assert_eq!(txs[0]["operation"], "add");
}

#[tokio::test]
async fn forecast_and_reorder_are_advisory() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, server.url("/inventory/gabrielle-essence/50ml/forecast?days=14")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["horizon_days"], 14);
    assert!(body["predicted_demand"].as_u64().unwrap() > 0);

    let (status, body) = get_json(&client, server.url("/inventory/gabrielle-essence/50ml/forecast?days=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_forecast_input");

    let (status, body) = get_json(&client, server.url("/inventory/gabrielle-essence/100ml/reorder")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["urgency"], "high");
    assert_eq!(body["supplier"], "Luxury Fragrances Inc");

    // Nothing changed.
    let (_, body) = get_json(&client, server.url("/inventory/gabrielle-essence/100ml")).await;
    assert_eq!(body["stock"], 3);
}

#[tokio::test]
async fn report_covers_every_size() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = get_json(&client, server.url("/reports/inventory")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_products"], 1);
    assert_eq!(body["low_stock_items"].as_array().unwrap().len(), 1);
    assert_eq!(body["reorder_suggestions"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_value"], 13 * 9999 + 7 * 14999 + 3 * 19999);
}

#[tokio::test]
async fn malformed_ids_are_rejected() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(&client, server.url("/reservations/not-a-uuid/confirm"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");
}
