use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::ReservationId;

use crate::product::StockKey;

/// Reservation lifecycle.
///
/// `Active → {Expired | Released | Confirmed}`. Only active reservations
/// carry a pending auto-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Active,
    /// Auto-release cancelled; the hold now belongs to the checkout flow.
    Confirmed,
    /// Cancelled by the caller and returned to the pool.
    Released,
    /// The timeout fired and the hold went back to the pool.
    Expired,
}

/// A temporary hold on stock for an in-flight cart action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub key: StockKey,
    pub quantity: u32,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: ReservationState,
}

/// Pending auto-releases, keyed by reservation id.
///
/// Finished reservations leave the book; the caller gets the final record.
#[derive(Debug, Clone, Default)]
pub struct ReservationBook {
    active: HashMap<ReservationId, Reservation>,
}

impl ReservationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, key: StockKey, quantity: u32, reserved_at: DateTime<Utc>, ttl: chrono::Duration) -> Reservation {
        let reservation = Reservation {
            id: ReservationId::new(),
            key,
            quantity,
            reserved_at,
            expires_at: reserved_at + ttl,
            state: ReservationState::Active,
        };
        self.active.insert(reservation.id, reservation.clone());
        reservation
    }

    pub fn get(&self, id: ReservationId) -> Option<&Reservation> {
        self.active.get(&id)
    }

    /// Close an active reservation with a terminal state.
    pub fn close(&mut self, id: ReservationId, state: ReservationState) -> Option<Reservation> {
        debug_assert!(state != ReservationState::Active);
        let mut reservation = self.active.remove(&id)?;
        reservation.state = state;
        Some(reservation)
    }

    /// Ids of active reservations whose timeout has passed, oldest first.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<ReservationId> {
        let mut due: Vec<_> = self.active.values().filter(|r| r.expires_at <= now).collect();
        due.sort_by_key(|r| (r.expires_at, r.id));
        due.into_iter().map(|r| r.id).collect()
    }

    /// Earliest pending expiry, if any.
    pub fn next_expiry(&self) -> Option<DateTime<Utc>> {
        self.active.values().map(|r| r.expires_at).min()
    }

    pub fn active(&self) -> impl Iterator<Item = &Reservation> {
        self.active.values()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
