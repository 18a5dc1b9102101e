//! Process-wide inventory context.
//!
//! One `InventoryContext` is built at startup and shared (via `Arc`) by the
//! HTTP layer and the background runners. A single lock guards the domain
//! state, so operations on the same slot apply in lock-acquisition order.
//!
//! After every operation the domain outbox is drained, in order:
//! 1) records are appended to the record log (failures logged, not fatal)
//! 2) an analytics event goes to the telemetry sink
//! 3) the event is published on the bus

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use storefront_core::{AlertId, ProductId, ReservationId, SizeLabel};
use storefront_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use storefront_forecast::{DemandForecaster, ReorderSuggestion, SeasonalCalendar};
use storefront_inventory::seed::{storefront_catalog, storefront_sales_history};
use storefront_inventory::{
    Direction, Inventory, InventoryEvent, InventoryReport, InventoryTransaction, Product, Reservation, StockAlert,
    StockError, StockStatus,
};

use crate::config::InventoryConfig;
use crate::record_log::{
    ALERTS_KEY, InMemoryRecordLog, JsonFileRecordLog, RecordLog, RecordLogError, TRANSACTIONS_KEY, append_record,
    read_records,
};
use crate::telemetry::{HttpBeacon, NoopTelemetry, TelemetryEvent, TelemetrySink};

pub type InventoryEnvelope = EventEnvelope<InventoryEvent>;
pub type InventoryBus = InMemoryEventBus<InventoryEnvelope>;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Records(#[from] RecordLogError),

    #[error("inventory lock poisoned")]
    Poisoned,
}

pub struct InventoryContext {
    inventory: Mutex<Inventory>,
    bus: Arc<InventoryBus>,
    records: Arc<dyn RecordLog>,
    telemetry: Arc<dyn TelemetrySink>,
    sequence: AtomicU64,
}

impl InventoryContext {
    pub fn new(inventory: Inventory, records: Arc<dyn RecordLog>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            inventory: Mutex::new(inventory),
            bus: Arc::new(InventoryBus::new()),
            records,
            telemetry,
            sequence: AtomicU64::new(0),
        }
    }

    /// In-memory records, telemetry disabled.
    pub fn in_memory(inventory: Inventory) -> Self {
        Self::new(inventory, Arc::new(InMemoryRecordLog::new()), Arc::new(NoopTelemetry))
    }

    /// Seeded storefront catalog wired to the configured record log and
    /// telemetry collector.
    pub fn from_config(config: &InventoryConfig) -> anyhow::Result<Self> {
        let ledger = storefront_catalog().context("failed to build the storefront catalog")?;
        let history = storefront_sales_history().context("failed to load sales history")?;
        let inventory = Inventory::new(ledger, DemandForecaster::new(history, SeasonalCalendar::default()))
            .with_reservation_ttl(config.reservation_ttl_chrono());

        let records: Arc<dyn RecordLog> = match &config.data_dir {
            Some(dir) => {
                let log = JsonFileRecordLog::open(dir)
                    .with_context(|| format!("failed to open data directory {}", dir.display()))?;
                info!(data_dir = %dir.display(), "using json record log");
                Arc::new(log)
            }
            None => {
                info!("using in-memory record log");
                Arc::new(InMemoryRecordLog::new())
            }
        };

        let telemetry: Arc<dyn TelemetrySink> = match &config.telemetry_url {
            Some(url) => {
                let beacon = HttpBeacon::spawn(url.clone()).context("failed to start telemetry beacon")?;
                info!(endpoint = %url, "telemetry enabled");
                Arc::new(beacon)
            }
            None => Arc::new(NoopTelemetry),
        };

        Ok(Self::new(inventory, records, telemetry))
    }

    pub fn bus(&self) -> &Arc<InventoryBus> {
        &self.bus
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> Subscription<InventoryEnvelope> {
        self.bus.subscribe()
    }

    pub fn records(&self) -> &dyn RecordLog {
        &*self.records
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inventory>, ContextError> {
        self.inventory.lock().map_err(|_| ContextError::Poisoned)
    }

    fn read<R>(&self, f: impl FnOnce(&Inventory) -> R) -> Result<R, ContextError> {
        let inventory = self.lock()?;
        Ok(f(&*inventory))
    }

    /// Run a mutation and dispatch its events while still holding the lock,
    /// so sequence numbers follow mutation order.
    fn apply<R>(&self, f: impl FnOnce(&mut Inventory) -> R) -> Result<R, ContextError> {
        let mut inventory = self.lock()?;
        let out = f(&mut *inventory);
        for event in inventory.take_events() {
            self.dispatch(event);
        }
        Ok(out)
    }

    fn dispatch(&self, event: InventoryEvent) {
        log_event(&event);

        match &event {
            InventoryEvent::StockAdjusted(e) => self.persist(TRANSACTIONS_KEY, &e.transaction),
            InventoryEvent::AlertRaised(e) => self.persist(ALERTS_KEY, &e.alert),
            _ => {}
        }

        self.telemetry.emit(TelemetryEvent::from_inventory(&event));

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = self.bus.publish(EventEnvelope::wrap(sequence, event)) {
            warn!(error = ?e, sequence, "failed to publish inventory event");
        }
    }

    fn persist<T: Serialize>(&self, key: &str, record: &T) {
        if let Err(e) = append_record(&*self.records, key, record) {
            warn!(key, error = %e, "failed to persist record");
        }
    }

    // -------------------------
    // Queries
    // -------------------------

    pub fn get_available(&self, product: &ProductId, size: &SizeLabel) -> Result<u32, ContextError> {
        self.read(|inv| inv.get_available(product, size))
    }

    pub fn stock_status(&self, product: &ProductId, size: &SizeLabel) -> Result<Option<StockStatus>, ContextError> {
        self.read(|inv| inv.stock_status(product, size))
    }

    pub fn products(&self) -> Result<Vec<Product>, ContextError> {
        self.read(|inv| inv.ledger().products().cloned().collect())
    }

    pub fn product(&self, id: &ProductId) -> Result<Option<Product>, ContextError> {
        self.read(|inv| inv.ledger().product(id).cloned())
    }

    pub fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, ContextError> {
        self.read(|inv| inv.reservations().get(id).cloned())
    }

    pub fn alerts(&self, unresolved_only: bool) -> Result<Vec<StockAlert>, ContextError> {
        self.read(|inv| {
            if unresolved_only {
                inv.alerts().unresolved().cloned().collect()
            } else {
                inv.alerts().all().to_vec()
            }
        })
    }

    pub fn predict_demand(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        horizon_days: u32,
        on: NaiveDate,
    ) -> Result<u32, ContextError> {
        self.read(|inv| inv.predict_demand(product, size, horizon_days, on))
    }

    pub fn suggest_reorder(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        on: NaiveDate,
    ) -> Result<Option<ReorderSuggestion>, ContextError> {
        self.read(|inv| inv.suggest_reorder(product, size, on))
    }

    pub fn report(&self, now: DateTime<Utc>) -> Result<InventoryReport, ContextError> {
        self.read(|inv| inv.report(now))
    }

    /// Committed adjustments as persisted, oldest first.
    pub fn transactions(&self) -> Result<Vec<InventoryTransaction>, ContextError> {
        Ok(read_records(&*self.records, TRANSACTIONS_KEY)?)
    }

    /// Raised alerts as persisted, oldest first.
    pub fn persisted_alerts(&self) -> Result<Vec<StockAlert>, ContextError> {
        Ok(read_records(&*self.records, ALERTS_KEY)?)
    }

    // -------------------------
    // Mutations
    // -------------------------

    pub fn adjust(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Result<InventoryTransaction, ContextError> {
        Ok(self.apply(|inv| inv.adjust(product, size, quantity, direction, now))??)
    }

    pub fn reserve(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Reservation, ContextError> {
        Ok(self.apply(|inv| inv.reserve(product, size, quantity, now))??)
    }

    pub fn release(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, ContextError> {
        Ok(self.apply(|inv| inv.release(product, size, quantity, now))??)
    }

    pub fn confirm(&self, id: ReservationId, now: DateTime<Utc>) -> Result<Option<Reservation>, ContextError> {
        self.apply(|inv| inv.confirm(id, now))
    }

    pub fn cancel(&self, id: ReservationId, now: DateTime<Utc>) -> Result<Option<Reservation>, ContextError> {
        self.apply(|inv| inv.cancel(id, now))
    }

    pub fn expire_due(&self, now: DateTime<Utc>) -> Result<Vec<Reservation>, ContextError> {
        self.apply(|inv| inv.expire_due(now))
    }

    pub fn check_stock_levels(
        &self,
        product: &ProductId,
        size: &SizeLabel,
        now: DateTime<Utc>,
    ) -> Result<Option<StockAlert>, ContextError> {
        self.apply(|inv| inv.check_stock_levels(product, size, now))
    }

    pub fn sweep(&self, now: DateTime<Utc>) -> Result<Vec<StockAlert>, ContextError> {
        self.apply(|inv| inv.sweep(now))
    }

    pub fn resolve_alert(&self, id: AlertId, now: DateTime<Utc>) -> Result<bool, ContextError> {
        self.apply(|inv| inv.resolve_alert(id, now))
    }
}

fn log_event(event: &InventoryEvent) {
    match event {
        InventoryEvent::StockAdjusted(e) => info!(
            product = %e.transaction.product,
            size = %e.transaction.size,
            quantity = e.transaction.quantity,
            operation = e.transaction.direction.as_str(),
            stock = e.stock_after,
            available = e.available_after,
            "stock adjusted"
        ),
        InventoryEvent::StockReserved(e) => info!(
            reservation_id = %e.reservation.id,
            product = %e.reservation.key.product,
            size = %e.reservation.key.size,
            quantity = e.reservation.quantity,
            expires_at = %e.reservation.expires_at,
            available = e.available_after,
            "stock reserved"
        ),
        InventoryEvent::StockReleased(e) => info!(
            product = %e.key.product,
            size = %e.key.size,
            requested = e.requested,
            released = e.released,
            reason = ?e.reason,
            available = e.available_after,
            "stock released"
        ),
        InventoryEvent::ReservationConfirmed(e) => info!(
            reservation_id = %e.reservation.id,
            product = %e.reservation.key.product,
            size = %e.reservation.key.size,
            "reservation confirmed"
        ),
        InventoryEvent::AlertRaised(e) => warn!(
            alert_id = %e.alert.id,
            product = %e.alert.product,
            size = %e.alert.size,
            kind = e.alert.kind.as_str(),
            "{}",
            e.alert.message(None)
        ),
        InventoryEvent::AlertResolved(e) => info!(alert_id = %e.alert_id, "alert resolved"),
        InventoryEvent::ReorderSuggested(e) => debug!(
            product = %e.suggestion.product,
            size = %e.suggestion.size,
            quantity = e.suggestion.suggested_quantity,
            urgency = ?e.suggestion.urgency,
            "reorder suggested"
        ),
    }
}
