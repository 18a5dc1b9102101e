//! Background runners driving the time-based parts of the inventory.
//!
//! Each runner owns one thread, stops through its handle, and never lets an
//! error escape its loop.

pub mod expiry;
pub mod sweeper;

use std::sync::{Arc, mpsc};
use std::thread;

pub use expiry::ExpiryRunner;
pub use sweeper::ThresholdSweeper;

use crate::config::InventoryConfig;
use crate::context::InventoryContext;

/// Start the expiry runner and the threshold sweeper for `ctx`.
pub fn spawn_all(ctx: &Arc<InventoryContext>, config: &InventoryConfig) -> std::io::Result<Vec<RunnerHandle>> {
    let expiry = ExpiryRunner::new(config.expiry_poll).spawn(Arc::clone(ctx))?;
    let sweeper = ThresholdSweeper::new(config.sweep_interval).spawn(Arc::clone(ctx))?;
    Ok(vec![expiry, sweeper])
}

/// Handle for a running background runner (shutdown + trigger hook).
#[derive(Debug)]
pub struct RunnerHandle {
    name: &'static str,
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl RunnerHandle {
    pub(crate) fn new(
        name: &'static str,
        shutdown: mpsc::Sender<()>,
        trigger: mpsc::SyncSender<()>,
        join: thread::JoinHandle<()>,
    ) -> Self {
        Self {
            name,
            shutdown,
            trigger,
            join: Some(join),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the runner to do a pass now instead of waiting for its next tick.
    ///
    /// Triggers are coalesced: if a pass is already pending this is a no-op.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner thread and wait for it to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        // Wake the loop if it is parked waiting for a trigger.
        let _ = self.trigger.try_send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Channels shared by every runner loop.
pub(crate) struct RunnerSignals {
    shutdown: mpsc::Receiver<()>,
    trigger: mpsc::Receiver<()>,
}

impl RunnerSignals {
    /// Wait up to `timeout` for a trigger.
    ///
    /// Returns `None` once shutdown was requested (or the handle is gone),
    /// otherwise whether a trigger arrived.
    pub fn wait(&self, timeout: std::time::Duration) -> Option<bool> {
        if self.stopping() {
            return None;
        }
        match self.trigger.recv_timeout(timeout) {
            Ok(()) => {
                if self.stopping() {
                    return None;
                }
                // Coalesce anything queued behind it.
                while self.trigger.try_recv().is_ok() {}
                Some(true)
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Some(false),
            Err(mpsc::RecvTimeoutError::Disconnected) => None,
        }
    }

    fn stopping(&self) -> bool {
        matches!(
            self.shutdown.try_recv(),
            Ok(()) | Err(mpsc::TryRecvError::Disconnected)
        )
    }
}

/// Spawn a named runner thread wired to a fresh handle.
pub(crate) fn spawn_runner<F>(name: &'static str, body: F) -> std::io::Result<RunnerHandle>
where
    F: FnOnce(RunnerSignals) + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);

    let join = thread::Builder::new().name(name.to_string()).spawn(move || {
        body(RunnerSignals {
            shutdown: shutdown_rx,
            trigger: trigger_rx,
        })
    })?;

    Ok(RunnerHandle::new(name, shutdown_tx, trigger_tx, join))
}
