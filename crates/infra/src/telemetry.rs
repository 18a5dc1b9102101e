//! Fire-and-forget analytics beacon.
//!
//! `emit` never blocks and never reports failure. The HTTP sink hands events
//! to a background thread that posts them one by one; send errors are logged
//! at debug level and dropped.

use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use storefront_events::Event;
use storefront_inventory::InventoryEvent;

/// Pending events beyond this are dropped.
const BEACON_QUEUE: usize = 256;
const BEACON_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl TelemetryEvent {
    pub fn new(event: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            event: event.into(),
            timestamp,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Analytics view of an inventory fact.
    pub fn from_inventory(event: &InventoryEvent) -> Self {
        let base = Self::new(event.event_type(), event.occurred_at());
        match event {
            InventoryEvent::StockAdjusted(e) => base
                .with("product_id", json!(e.transaction.product))
                .with("size", json!(e.transaction.size))
                .with("quantity", json!(e.transaction.quantity))
                .with("operation", json!(e.transaction.direction))
                .with("available", json!(e.available_after)),
            InventoryEvent::StockReserved(e) => base
                .with("product_id", json!(e.reservation.key.product))
                .with("size", json!(e.reservation.key.size))
                .with("quantity", json!(e.reservation.quantity))
                .with("available", json!(e.available_after)),
            InventoryEvent::StockReleased(e) => base
                .with("product_id", json!(e.key.product))
                .with("size", json!(e.key.size))
                .with("quantity", json!(e.released))
                .with("reason", json!(e.reason))
                .with("available", json!(e.available_after)),
            InventoryEvent::ReservationConfirmed(e) => base
                .with("product_id", json!(e.reservation.key.product))
                .with("size", json!(e.reservation.key.size))
                .with("quantity", json!(e.reservation.quantity)),
            InventoryEvent::AlertRaised(e) => base
                .with("product_id", json!(e.alert.product))
                .with("size", json!(e.alert.size))
                .with("alert_type", json!(e.alert.kind)),
            InventoryEvent::AlertResolved(e) => base.with("alert_id", json!(e.alert_id)),
            InventoryEvent::ReorderSuggested(e) => base
                .with("product_id", json!(e.suggestion.product))
                .with("size", json!(e.suggestion.size))
                .with("quantity", json!(e.suggestion.suggested_quantity))
                .with("urgency", json!(e.suggestion.urgency)),
        }
    }
}

pub trait TelemetrySink: Send + Sync + 'static {
    fn emit(&self, event: TelemetryEvent);
}

/// Telemetry disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: TelemetryEvent) {}
}

/// Records emitted events; for tests and local inspection.
#[derive(Debug, Default)]
pub struct InMemoryTelemetry {
    inner: Mutex<Vec<TelemetryEvent>>,
}

impl InMemoryTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<TelemetryEvent> {
        self.inner.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl TelemetrySink for InMemoryTelemetry {
    fn emit(&self, event: TelemetryEvent) {
        if let Ok(mut v) = self.inner.lock() {
            v.push(event);
        }
    }
}

#[derive(Debug, Error)]
enum TelemetryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("collector answered {0}")]
    Status(reqwest::StatusCode),
}

/// Posts events as JSON to an analytics collector.
#[derive(Debug)]
pub struct HttpBeacon {
    queue: mpsc::SyncSender<TelemetryEvent>,
}

impl HttpBeacon {
    /// Start the sender thread. The thread exits once the beacon is dropped.
    pub fn spawn(endpoint: impl Into<String>) -> std::io::Result<Self> {
        let endpoint = endpoint.into();
        let (tx, rx) = mpsc::sync_channel::<TelemetryEvent>(BEACON_QUEUE);

        thread::Builder::new()
            .name("telemetry-beacon".to_string())
            .spawn(move || beacon_loop(&endpoint, rx))?;

        Ok(Self { queue: tx })
    }
}

impl TelemetrySink for HttpBeacon {
    fn emit(&self, event: TelemetryEvent) {
        if let Err(e) = self.queue.try_send(event) {
            debug!(error = %e, "telemetry event dropped");
        }
    }
}

fn beacon_loop(endpoint: &str, rx: mpsc::Receiver<TelemetryEvent>) {
    let client = match reqwest::blocking::Client::builder().timeout(BEACON_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "telemetry client unavailable, beacon disabled");
            // Keep draining so senders never see a full queue.
            for _ in rx {}
            return;
        }
    };

    for event in rx {
        if let Err(e) = post(&client, endpoint, &event) {
            debug!(error = %e, event = %event.event, "telemetry post failed");
        }
    }
}

fn post(client: &reqwest::blocking::Client, endpoint: &str, event: &TelemetryEvent) -> Result<(), TelemetryError> {
    let response = client.post(endpoint).json(event).send()?;
    if !response.status().is_success() {
        return Err(TelemetryError::Status(response.status()));
    }
    Ok(())
}
