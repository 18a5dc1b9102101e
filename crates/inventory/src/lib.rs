//! Inventory domain: per-size stock, reservations, threshold alerts and
//! reorder advice for the storefront catalog.
//!
//! Pure domain logic (no IO, no HTTP, no storage). Operations take the
//! current time as an argument and queue [`InventoryEvent`]s; the
//! infrastructure layer drains them to persist, publish and report.

pub mod alert;
pub mod event;
pub mod inventory;
pub mod ledger;
pub mod product;
pub mod report;
pub mod reservation;
pub mod seed;
pub mod status;
pub mod threshold;
pub mod transaction;

pub use alert::{AlertKind, AlertLog, StockAlert};
pub use event::{
    AlertRaised, AlertResolved, InventoryEvent, ReleaseReason, ReorderSuggested, ReservationConfirmed,
    StockAdjusted, StockReleased, StockReserved,
};
pub use inventory::{DEFAULT_RESERVATION_TTL_SECS, Inventory};
pub use ledger::{StockError, StockLedger};
pub use product::{NewProduct, Product, SizeStock, StockKey, StockLevels};
pub use report::{InventoryReport, LowStockItem, OutOfStockItem};
pub use reservation::{Reservation, ReservationBook, ReservationState};
pub use status::StockStatus;
pub use threshold::{CheckTrigger, StockLevel, ThresholdMonitor};
pub use transaction::{Direction, InventoryTransaction, SYSTEM_ACTOR};
