use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AlertId, ReservationId};
use storefront_events::Event;
use storefront_forecast::ReorderSuggestion;

use crate::alert::StockAlert;
use crate::product::StockKey;
use crate::reservation::Reservation;
use crate::transaction::InventoryTransaction;

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub transaction: InventoryTransaction,
    pub stock_after: u32,
    pub available_after: u32,
}

/// Event: StockReserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReserved {
    pub reservation: Reservation,
    pub available_after: u32,
}

/// Why reserved units went back to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// `release(product, size, quantity)` called directly.
    Explicit,
    /// A reservation was cancelled through its handle.
    Cancelled,
    /// A reservation timed out.
    Expired,
}

/// Event: StockReleased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReleased {
    pub key: StockKey,
    pub reservation_id: Option<ReservationId>,
    pub requested: u32,
    pub released: u32,
    pub reason: ReleaseReason,
    pub available_after: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReservationConfirmed (auto-release cancelled, hold kept).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    pub reservation: Reservation,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AlertRaised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRaised {
    pub alert: StockAlert,
}

/// Event: AlertResolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertResolved {
    pub alert_id: AlertId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReorderSuggested (follows every reorder-needed alert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSuggested {
    pub suggestion: ReorderSuggestion,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    StockAdjusted(StockAdjusted),
    StockReserved(StockReserved),
    StockReleased(StockReleased),
    ReservationConfirmed(ReservationConfirmed),
    AlertRaised(AlertRaised),
    AlertResolved(AlertResolved),
    ReorderSuggested(ReorderSuggested),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StockAdjusted(_) => "inventory.stock.adjusted",
            InventoryEvent::StockReserved(_) => "inventory.stock.reserved",
            InventoryEvent::StockReleased(_) => "inventory.stock.released",
            InventoryEvent::ReservationConfirmed(_) => "inventory.reservation.confirmed",
            InventoryEvent::AlertRaised(_) => "inventory.alert.raised",
            InventoryEvent::AlertResolved(_) => "inventory.alert.resolved",
            InventoryEvent::ReorderSuggested(_) => "inventory.reorder.suggested",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::StockAdjusted(e) => e.transaction.occurred_at,
            InventoryEvent::StockReserved(e) => e.reservation.reserved_at,
            InventoryEvent::StockReleased(e) => e.occurred_at,
            InventoryEvent::ReservationConfirmed(e) => e.occurred_at,
            InventoryEvent::AlertRaised(e) => e.alert.created_at,
            InventoryEvent::AlertResolved(e) => e.occurred_at,
            InventoryEvent::ReorderSuggested(e) => e.occurred_at,
        }
    }
}
