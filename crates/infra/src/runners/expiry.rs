use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::{RunnerHandle, spawn_runner};
use crate::context::InventoryContext;

/// Releases reservations whose timeout has passed.
#[derive(Debug, Clone)]
pub struct ExpiryRunner {
    pub poll: Duration,
}

impl Default for ExpiryRunner {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(1000),
        }
    }
}

impl ExpiryRunner {
    pub fn new(poll: Duration) -> Self {
        Self { poll }
    }

    pub fn spawn(&self, ctx: Arc<InventoryContext>) -> std::io::Result<RunnerHandle> {
        let poll = self.poll.max(Duration::from_millis(1));
        spawn_runner("reservation-expiry", move |signals| {
            info!(runner = "reservation-expiry", poll_ms = poll.as_millis() as u64, "expiry runner started");

            while signals.wait(poll).is_some() {
                match ctx.expire_due(Utc::now()) {
                    Ok(expired) if !expired.is_empty() => {
                        info!(runner = "reservation-expiry", count = expired.len(), "reservations expired");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(runner = "reservation-expiry", error = %e, "expiry pass failed"),
                }
            }

            info!(runner = "reservation-expiry", "expiry runner stopped");
        })
    }
}
