//! Infrastructure layer: configuration, record persistence, telemetry,
//! background runners and the shared inventory context.

pub mod config;
pub mod context;
pub mod record_log;
pub mod runners;
pub mod telemetry;

pub use config::InventoryConfig;
pub use context::{ContextError, InventoryBus, InventoryContext, InventoryEnvelope};
pub use record_log::{InMemoryRecordLog, JsonFileRecordLog, RecordLog, RecordLogError};
pub use runners::{ExpiryRunner, RunnerHandle, ThresholdSweeper};
pub use telemetry::{HttpBeacon, InMemoryTelemetry, NoopTelemetry, TelemetryEvent, TelemetrySink};
