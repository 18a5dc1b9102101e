use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use super::{RunnerHandle, spawn_runner};
use crate::context::InventoryContext;

/// Periodic drift sweep over every stock slot.
///
/// Runs once on startup, then every `interval`, and whenever triggered.
#[derive(Debug, Clone)]
pub struct ThresholdSweeper {
    pub interval: Duration,
}

impl Default for ThresholdSweeper {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl ThresholdSweeper {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn spawn(&self, ctx: Arc<InventoryContext>) -> std::io::Result<RunnerHandle> {
        let interval = self.interval.max(Duration::from_millis(1));
        spawn_runner("threshold-sweeper", move |signals| {
            info!(runner = "threshold-sweeper", interval_secs = interval.as_secs(), "threshold sweeper started");

            let mut next_tick = Instant::now();
            loop {
                let wait = next_tick.saturating_duration_since(Instant::now());
                let Some(triggered) = signals.wait(wait) else {
                    break;
                };

                let now = Instant::now();
                if !triggered && now < next_tick {
                    continue;
                }
                if now >= next_tick {
                    // Keep a stable cadence even if we were delayed.
                    while next_tick <= now {
                        next_tick += interval;
                    }
                }

                match ctx.sweep(Utc::now()) {
                    Ok(alerts) if !alerts.is_empty() => {
                        info!(runner = "threshold-sweeper", count = alerts.len(), "sweep raised alerts");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(runner = "threshold-sweeper", error = %e, "sweep failed"),
                }
            }

            info!(runner = "threshold-sweeper", "threshold sweeper stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_forecast::{DemandForecaster, HistoricalSales, SeasonalCalendar};
    use storefront_inventory::seed::storefront_catalog;
    use storefront_inventory::{AlertKind, Inventory, InventoryEvent};

    fn context() -> Arc<InventoryContext> {
        let inventory = Inventory::new(
            storefront_catalog().unwrap(),
            DemandForecaster::new(HistoricalSales::new(), SeasonalCalendar::flat()),
        );
        Arc::new(InventoryContext::in_memory(inventory))
    }

    fn raised(sub: &storefront_events::Subscription<crate::context::InventoryEnvelope>, want: usize) -> Vec<AlertKind> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut kinds = Vec::new();
        while kinds.len() < want && Instant::now() < deadline {
            if let Ok(envelope) = sub.recv_timeout(Duration::from_millis(100)) {
                if let InventoryEvent::AlertRaised(e) = envelope.payload() {
                    kinds.push(e.alert.kind);
                }
            }
        }
        kinds
    }

    #[test]
    fn first_pass_runs_on_startup() {
        let ctx = context();
        let sub = ctx.subscribe();

        // Long interval: only the startup pass can run during the test.
        let handle = ThresholdSweeper::new(Duration::from_secs(3600)).spawn(ctx.clone()).unwrap();
        let mut kinds = raised(&sub, 2);
        handle.shutdown();

        kinds.sort_by_key(|k| k.as_str());
        assert_eq!(kinds, vec![AlertKind::CriticalLow, AlertKind::ReorderNeeded]);
    }

    #[test]
    fn triggered_pass_does_not_repeat_alerts() {
        let ctx = context();
        let sub = ctx.subscribe();

        let handle = ThresholdSweeper::new(Duration::from_secs(3600)).spawn(ctx.clone()).unwrap();
        assert_eq!(raised(&sub, 2).len(), 2);

        handle.trigger();
        std::thread::sleep(Duration::from_millis(200));
        handle.shutdown();

        assert!(sub.drain().is_empty());
        assert_eq!(ctx.alerts(false).unwrap().len(), 2);
    }
}
