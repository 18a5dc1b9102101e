//! The inventory engine: ledger, reservations, threshold monitor, alert log
//! and forecaster behind one set of operations.
//!
//! Every operation takes the current time explicitly and queues the facts it
//! produced in an outbox. Callers drain the outbox with
//! [`Inventory::take_events`] after each call and handle persistence and
//! publication themselves.

use chrono::{DateTime, NaiveDate, Utc};

use storefront_core::{AlertId, Entity, Money, ProductId, ReservationId, SizeLabel};
use storefront_forecast::{DemandForecaster, ReorderInputs, ReorderSuggestion};

use crate::alert::{AlertKind, AlertLog, StockAlert};
use crate::event::{
    AlertRaised, AlertResolved, InventoryEvent, ReleaseReason, ReorderSuggested, ReservationConfirmed,
    StockAdjusted, StockReleased, StockReserved,
};
use crate::ledger::{StockError, StockLedger};
use crate::product::{Product, StockKey};
use crate::report::{InventoryReport, LowStockItem, OutOfStockItem};
use crate::reservation::{Reservation, ReservationBook, ReservationState};
use crate::status::StockStatus;
use crate::threshold::{CheckTrigger, ThresholdMonitor};
use crate::transaction::{Direction, InventoryTransaction};

/// How long a reservation holds stock before it is released automatically.
pub const DEFAULT_RESERVATION_TTL_SECS: i64 = 15 * 60;

#[derive(Debug, Clone)]
pub struct Inventory {
    ledger: StockLedger,
    reservations: ReservationBook,
    monitor: ThresholdMonitor,
    alerts: AlertLog,
    forecaster: DemandForecaster,
    reservation_ttl: chrono::Duration,
    outbox: Vec<InventoryEvent>,
}

impl Inventory {
    pub fn new(ledger: StockLedger, forecaster: DemandForecaster) -> Self {
        Self {
            ledger,
            reservations: ReservationBook::new(),
            monitor: ThresholdMonitor::new(),
            alerts: AlertLog::new(),
            forecaster,
            reservation_ttl: chrono::Duration::seconds(DEFAULT_RESERVATION_TTL_SECS),
            outbox: Vec::new(),
        }
    }

    pub fn with_reservation_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.reservation_ttl = ttl;
        self
    }

    pub fn reservation_ttl(&self) -> chrono::Duration {
        self.reservation_ttl
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn reservations(&self) -> &ReservationBook {
        &self.reservations
    }

    pub fn forecaster(&self) -> &DemandForecaster {
        &self.forecaster
    }

    /// Drain queued events in the order they happened.
    pub fn take_events(&mut self) -> Vec<InventoryEvent> {
        std::mem::take(&mut self.outbox)
    }

    // -------------------------
    // Stock ledger
    // -------------------------

    pub fn get_available(&self, product: &ProductId, size: &SizeLabel) -> u32 {
        self.ledger.get_available(product, size)
    }

    /// Display band for a size, `None` when the size is unknown.
    pub fn stock_status(&self, product: &ProductId, size: &SizeLabel) -> Option<StockStatus> {
        self.ledger
            .size_stock(product, size)
            .map(|s| StockStatus::of(s.available()))
    }

    /// Apply a stock adjustment, then run the threshold check.
    ///
    /// An over-decrement raises an `insufficient-stock` alert and leaves the
    /// slot untouched.
    pub fn adjust(
        &mut self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Result<InventoryTransaction, StockError> {
        match self.ledger.adjust(product, size, quantity, direction, now) {
            Ok(transaction) => {
                let (stock_after, available_after) = self.counts(product, size);
                self.outbox.push(InventoryEvent::StockAdjusted(StockAdjusted {
                    transaction: transaction.clone(),
                    stock_after,
                    available_after,
                }));
                self.check(product, size, CheckTrigger::Mutation, now);
                Ok(transaction)
            }
            Err(err @ StockError::InsufficientStock { .. }) => {
                self.raise_alert(product, size, AlertKind::InsufficientStock, now);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    // -------------------------
    // Reservations
    // -------------------------

    /// Hold `quantity` units; the hold is released automatically once the
    /// reservation TTL passes unless it is confirmed or cancelled first.
    pub fn reserve(
        &mut self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StockError> {
        self.ledger.hold(product, size, quantity)?;

        let key = StockKey::new(product.clone(), size.clone());
        let reservation = self.reservations.open(key, quantity, now, self.reservation_ttl);
        self.outbox.push(InventoryEvent::StockReserved(StockReserved {
            reservation: reservation.clone(),
            available_after: self.ledger.get_available(product, size),
        }));
        Ok(reservation)
    }

    /// Return reserved units to the pool, floored at zero. Returns the
    /// number of units actually released.
    ///
    /// Releasing by key does not touch pending auto-releases; when they fire
    /// they release again, floored the same way.
    pub fn release(
        &mut self,
        product: &ProductId,
        size: &SizeLabel,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u32, StockError> {
        let key = StockKey::new(product.clone(), size.clone());
        self.release_key(key, None, quantity, ReleaseReason::Explicit, now)
    }

    /// Cancel the pending auto-release and keep the hold for checkout.
    pub fn confirm(&mut self, id: ReservationId, now: DateTime<Utc>) -> Option<Reservation> {
        let reservation = self.reservations.close(id, ReservationState::Confirmed)?;
        self.outbox.push(InventoryEvent::ReservationConfirmed(ReservationConfirmed {
            reservation: reservation.clone(),
            occurred_at: now,
        }));
        Some(reservation)
    }

    /// Cancel the pending auto-release and release the hold now.
    pub fn cancel(&mut self, id: ReservationId, now: DateTime<Utc>) -> Option<Reservation> {
        let reservation = self.reservations.close(id, ReservationState::Released)?;
        let _ = self.release_key(
            reservation.key.clone(),
            Some(reservation.id),
            reservation.quantity,
            ReleaseReason::Cancelled,
            now,
        );
        Some(reservation)
    }

    /// Release every reservation whose timeout has passed.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<Reservation> {
        let mut expired = Vec::new();
        for id in self.reservations.due(now) {
            let Some(reservation) = self.reservations.close(id, ReservationState::Expired) else {
                continue;
            };
            let _ = self.release_key(
                reservation.key.clone(),
                Some(reservation.id),
                reservation.quantity,
                ReleaseReason::Expired,
                now,
            );
            expired.push(reservation);
        }
        expired
    }

    fn release_key(
        &mut self,
        key: StockKey,
        reservation_id: Option<ReservationId>,
        quantity: u32,
        reason: ReleaseReason,
        now: DateTime<Utc>,
    ) -> Result<u32, StockError> {
        let released = self.ledger.release(&key.product, &key.size, quantity)?;
        let available_after = self.ledger.get_available(&key.product, &key.size);
        self.outbox.push(InventoryEvent::StockReleased(StockReleased {
            key,
            reservation_id,
            requested: quantity,
            released,
            reason,
            available_after,
            occurred_at: now,
        }));
        Ok(released)
    }

    // -------------------------
    // Threshold monitor
    // -------------------------

    /// Compare current stock with the product thresholds and raise an alert
    /// on breach. Not deduplicated.
    pub fn check_stock_levels(&mut self, product: &ProductId, size: &SizeLabel, now: DateTime<Utc>) -> Option<StockAlert> {
        self.check(product, size, CheckTrigger::Mutation, now)
    }

    /// Drift sweep over every slot. Raises alerts only for slots whose band
    /// changed since they were last observed.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> Vec<StockAlert> {
        self.ledger
            .keys()
            .into_iter()
            .filter_map(|key| self.check(&key.product, &key.size, CheckTrigger::Sweep, now))
            .collect()
    }

    fn check(&mut self, product: &ProductId, size: &SizeLabel, trigger: CheckTrigger, now: DateTime<Utc>) -> Option<StockAlert> {
        let p = self.ledger.product(product)?;
        let slot = p.size(size)?;
        let key = StockKey::new(product.clone(), size.clone());
        let kind = self.monitor.check(&key, slot.stock(), p.levels(), trigger)?;
        Some(self.raise_alert(product, size, kind, now))
    }

    fn raise_alert(&mut self, product: &ProductId, size: &SizeLabel, kind: AlertKind, now: DateTime<Utc>) -> StockAlert {
        let alert = StockAlert::new(product.clone(), size.clone(), kind, now);
        self.alerts.append(alert.clone());
        self.outbox.push(InventoryEvent::AlertRaised(AlertRaised { alert: alert.clone() }));

        if kind == AlertKind::ReorderNeeded {
            if let Some(suggestion) = self.suggest_reorder(product, size, now.date_naive()) {
                self.outbox.push(InventoryEvent::ReorderSuggested(ReorderSuggested {
                    suggestion,
                    occurred_at: now,
                }));
            }
        }

        alert
    }

    pub fn resolve_alert(&mut self, id: AlertId, now: DateTime<Utc>) -> bool {
        if !self.alerts.resolve(id) {
            return false;
        }
        self.outbox.push(InventoryEvent::AlertResolved(AlertResolved {
            alert_id: id,
            occurred_at: now,
        }));
        true
    }

    // -------------------------
    // Forecasting
    // -------------------------

    pub fn predict_demand(&self, product: &ProductId, size: &SizeLabel, horizon_days: u32, on: NaiveDate) -> u32 {
        self.forecaster.predict_demand(product, size, horizon_days, on)
    }

    /// Advisory reorder for a size; `None` when the size is unknown.
    pub fn suggest_reorder(&self, product: &ProductId, size: &SizeLabel, on: NaiveDate) -> Option<ReorderSuggestion> {
        let p = self.ledger.product(product)?;
        let inputs = reorder_inputs(p, size)?;
        Some(self.forecaster.suggest_reorder(&inputs, on))
    }

    /// Walk every slot and build the valuation / replenishment report.
    pub fn report(&self, now: DateTime<Utc>) -> InventoryReport {
        let mut report = InventoryReport {
            generated_at: now,
            total_products: self.ledger.products().count(),
            low_stock_items: Vec::new(),
            out_of_stock_items: Vec::new(),
            reorder_suggestions: Vec::new(),
            total_value: Money::ZERO,
        };

        for product in self.ledger.products() {
            let levels = product.levels();
            for (size, slot) in product.sizes() {
                let available = slot.available();
                report.total_value = report
                    .total_value
                    .saturating_add(slot.unit_price().times(u64::from(available)));

                if available == 0 {
                    report.out_of_stock_items.push(OutOfStockItem {
                        product: product.id().clone(),
                        size: size.clone(),
                        name: product.name().to_string(),
                    });
                } else if available <= levels.min_stock {
                    report.low_stock_items.push(LowStockItem {
                        product: product.id().clone(),
                        size: size.clone(),
                        name: product.name().to_string(),
                        available,
                        min_level: levels.min_stock,
                    });
                }

                if available <= levels.reorder_point {
                    if let Some(inputs) = reorder_inputs(product, size) {
                        report
                            .reorder_suggestions
                            .push(self.forecaster.suggest_reorder(&inputs, now.date_naive()));
                    }
                }
            }
        }

        report
    }

    fn counts(&self, product: &ProductId, size: &SizeLabel) -> (u32, u32) {
        self.ledger
            .size_stock(product, size)
            .map(|s| (s.stock(), s.available()))
            .unwrap_or((0, 0))
    }
}

fn reorder_inputs(product: &Product, size: &SizeLabel) -> Option<ReorderInputs> {
    let slot = product.size(size)?;
    let levels = product.levels();
    Some(ReorderInputs {
        product: product.id().clone(),
        size: size.clone(),
        current_stock: slot.stock(),
        min_stock: levels.min_stock,
        max_stock: levels.max_stock,
        lead_time_days: product.lead_time_days(),
        cost_price: product.cost_price(),
        supplier: product.supplier().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{GABRIELLE_ESSENCE, storefront_catalog, storefront_sales_history};
    use chrono::TimeZone;
    use storefront_forecast::SeasonalCalendar;

    fn pid() -> ProductId {
        ProductId::new(GABRIELLE_ESSENCE).unwrap()
    }

    fn ml(label: &str) -> SizeLabel {
        SizeLabel::new(label).unwrap()
    }

    /// A fixed January instant, so seasonal factors are 1.0.
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn inventory() -> Inventory {
        let forecaster = DemandForecaster::new(storefront_sales_history().unwrap(), SeasonalCalendar::default());
        Inventory::new(storefront_catalog().unwrap(), forecaster)
    }

    fn alert_kinds(events: &[InventoryEvent]) -> Vec<AlertKind> {
        events
            .iter()
            .filter_map(|e| match e {
                InventoryEvent::AlertRaised(a) => Some(a.alert.kind),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn seeded_fifty_ml_is_reorder_needed() {
        let mut inv = inventory();
        // stock=8, reserved=1, min=5, reorder=10
        assert_eq!(inv.get_available(&pid(), &ml("50ml")), 7);
        let alert = inv.check_stock_levels(&pid(), &ml("50ml"), t0()).unwrap();
        assert_eq!(alert.kind, AlertKind::ReorderNeeded);

        let events = inv.take_events();
        assert!(matches!(
            events.last(),
            Some(InventoryEvent::ReorderSuggested(ReorderSuggested { suggestion, .. })) if suggestion.suggested_quantity == 51
        ));
    }

    #[test]
    fn over_decrement_raises_insufficient_stock() {
        let mut inv = inventory();
        // 100ml has stock=3
        let err = inv
            .adjust(&pid(), &ml("100ml"), 5, Direction::Subtract, t0())
            .unwrap_err();
        assert!(matches!(err, StockError::InsufficientStock { requested: 5, available: 3 }));
        assert_eq!(inv.ledger().size_stock(&pid(), &ml("100ml")).unwrap().stock(), 3);
        assert_eq!(alert_kinds(&inv.take_events()), vec![AlertKind::InsufficientStock]);
    }

    #[test]
    fn unknown_sizes_fail_quietly() {
        let mut inv = inventory();
        assert_eq!(inv.get_available(&pid(), &ml("5ml")), 0);
        assert!(matches!(
            inv.adjust(&pid(), &ml("5ml"), 1, Direction::Subtract, t0()),
            Err(StockError::UnknownProductOrSize(_))
        ));
        assert!(inv.reserve(&pid(), &ml("5ml"), 1, t0()).is_err());
        assert!(inv.check_stock_levels(&pid(), &ml("5ml"), t0()).is_none());
        assert!(inv.take_events().is_empty());
    }

    #[test]
    fn crossing_critical_raises_exactly_one_alert_and_sweep_stays_quiet() {
        let mut inv = inventory();
        // 30ml: stock 15, reserved 2 -> subtract 10 leaves stock 5 (critical)
        inv.adjust(&pid(), &ml("30ml"), 10, Direction::Subtract, t0()).unwrap();
        assert_eq!(alert_kinds(&inv.take_events()), vec![AlertKind::CriticalLow]);

        let swept = inv.sweep(t0());
        assert!(swept.iter().all(|a| a.size != ml("30ml")));

        // Second sweep reports nothing at all.
        inv.take_events();
        assert!(inv.sweep(t0()).is_empty());
    }

    #[test]
    fn first_sweep_reports_seeded_breaches_once() {
        let mut inv = inventory();
        let first = inv.sweep(t0());
        let mut kinds: Vec<_> = first.iter().map(|a| (a.size.as_str().to_string(), a.kind)).collect();
        kinds.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            kinds,
            vec![
                ("100ml".to_string(), AlertKind::CriticalLow),
                ("50ml".to_string(), AlertKind::ReorderNeeded),
            ]
        );
        assert!(inv.sweep(t0()).is_empty());
        assert_eq!(inv.alerts().len(), 2);
    }

    #[test]
    fn reserve_and_expire_restore_availability() {
        let mut inv = inventory();
        let before = inv.get_available(&pid(), &ml("30ml"));

        let r = inv.reserve(&pid(), &ml("30ml"), 4, t0()).unwrap();
        assert_eq!(r.expires_at, t0() + chrono::Duration::minutes(15));
        assert_eq!(inv.get_available(&pid(), &ml("30ml")), before - 4);

        assert!(inv.expire_due(t0() + chrono::Duration::minutes(14)).is_empty());
        let expired = inv.expire_due(t0() + chrono::Duration::minutes(15));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].state, ReservationState::Expired);
        assert_eq!(inv.get_available(&pid(), &ml("30ml")), before);
    }

    #[test]
    fn reserve_more_than_available_fails() {
        let mut inv = inventory();
        // 50ml available = 7
        assert!(matches!(
            inv.reserve(&pid(), &ml("50ml"), 8, t0()),
            Err(StockError::InsufficientStock { requested: 8, available: 7 })
        ));
        assert!(inv.reserve(&pid(), &ml("50ml"), 7, t0()).is_ok());
        assert_eq!(inv.get_available(&pid(), &ml("50ml")), 0);
        assert_eq!(inv.stock_status(&pid(), &ml("50ml")), Some(StockStatus::Out));
    }

    #[test]
    fn confirmed_reservations_do_not_expire() {
        let mut inv = inventory();
        let r = inv.reserve(&pid(), &ml("30ml"), 2, t0()).unwrap();
        let confirmed = inv.confirm(r.id, t0()).unwrap();
        assert_eq!(confirmed.state, ReservationState::Confirmed);

        assert!(inv.expire_due(t0() + chrono::Duration::hours(1)).is_empty());
        // seeded reserved=2 plus this hold
        assert_eq!(inv.ledger().size_stock(&pid(), &ml("30ml")).unwrap().reserved(), 4);
        assert!(inv.confirm(r.id, t0()).is_none());
    }

    #[test]
    fn cancelled_reservations_release_immediately_and_only_once() {
        let mut inv = inventory();
        let before = inv.get_available(&pid(), &ml("30ml"));
        let r = inv.reserve(&pid(), &ml("30ml"), 3, t0()).unwrap();

        let cancelled = inv.cancel(r.id, t0()).unwrap();
        assert_eq!(cancelled.state, ReservationState::Released);
        assert_eq!(inv.get_available(&pid(), &ml("30ml")), before);

        assert!(inv.cancel(r.id, t0()).is_none());
        assert!(inv.expire_due(t0() + chrono::Duration::hours(1)).is_empty());
        assert_eq!(inv.get_available(&pid(), &ml("30ml")), before);
    }

    #[test]
    fn double_release_never_goes_below_zero() {
        let mut inv = inventory();
        // 100ml: reserved 0
        inv.reserve(&pid(), &ml("100ml"), 2, t0()).unwrap();
        assert_eq!(inv.release(&pid(), &ml("100ml"), 2, t0()).unwrap(), 2);
        assert_eq!(inv.release(&pid(), &ml("100ml"), 2, t0()).unwrap(), 0);
        assert_eq!(inv.ledger().size_stock(&pid(), &ml("100ml")).unwrap().reserved(), 0);

        // The pending auto-release fires later and is floored too.
        inv.expire_due(t0() + chrono::Duration::hours(1));
        assert_eq!(inv.ledger().size_stock(&pid(), &ml("100ml")).unwrap().reserved(), 0);
    }

    #[test]
    fn events_are_queued_in_order() {
        let mut inv = inventory();
        inv.reserve(&pid(), &ml("30ml"), 1, t0()).unwrap();
        inv.adjust(&pid(), &ml("30ml"), 5, Direction::Add, t0()).unwrap();
        inv.release(&pid(), &ml("30ml"), 1, t0()).unwrap();

        let types: Vec<_> = inv
            .take_events()
            .iter()
            .map(storefront_events::Event::event_type)
            .collect();
        assert_eq!(
            types,
            vec!["inventory.stock.reserved", "inventory.stock.adjusted", "inventory.stock.released"]
        );
        assert!(inv.take_events().is_empty());
    }

    #[test]
    fn resolve_alert_marks_and_emits() {
        let mut inv = inventory();
        let alert = inv.check_stock_levels(&pid(), &ml("100ml"), t0()).unwrap();
        inv.take_events();

        assert!(inv.resolve_alert(alert.id, t0()));
        assert!(inv.alerts().get(alert.id).unwrap().resolved);
        assert!(!inv.resolve_alert(AlertId::new(), t0()));
        assert_eq!(inv.take_events().len(), 1);
    }

    #[test]
    fn report_values_available_units() {
        let inv = inventory();
        let report = inv.report(t0());

        assert_eq!(report.total_products, 1);
        // 13 * 99.99 + 7 * 149.99 + 3 * 199.99
        assert_eq!(report.total_value, Money::from_cents(13 * 9999 + 7 * 14999 + 3 * 19999));
        assert!(report.out_of_stock_items.is_empty());
        assert_eq!(report.low_stock_items.len(), 1);
        assert_eq!(report.low_stock_items[0].size, ml("100ml"));
        // 50ml (7 <= 10) and 100ml (3 <= 10)
        assert_eq!(report.reorder_suggestions.len(), 2);
    }
}
