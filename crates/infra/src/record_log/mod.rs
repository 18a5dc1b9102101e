//! Append-only record log boundary.
//!
//! Records are JSON values grouped under a fixed key. The inventory layer
//! appends one record per committed transaction or raised alert; nothing is
//! ever rewritten.

pub mod in_memory;
pub mod json_file;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use in_memory::InMemoryRecordLog;
pub use json_file::JsonFileRecordLog;

/// Key for committed stock adjustments.
pub const TRANSACTIONS_KEY: &str = "inventory_transactions";
/// Key for raised stock alerts.
pub const ALERTS_KEY: &str = "stock_alerts";

#[derive(Debug, Error)]
pub enum RecordLogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid record key: {0}")]
    InvalidKey(String),

    #[error("record log lock poisoned")]
    Poisoned,
}

pub trait RecordLog: Send + Sync + 'static {
    fn append(&self, key: &str, record: serde_json::Value) -> Result<(), RecordLogError>;

    /// All records under `key` in append order; empty when nothing was written.
    fn read_all(&self, key: &str) -> Result<Vec<serde_json::Value>, RecordLogError>;
}

impl<L> RecordLog for Arc<L>
where
    L: RecordLog + ?Sized,
{
    fn append(&self, key: &str, record: serde_json::Value) -> Result<(), RecordLogError> {
        (**self).append(key, record)
    }

    fn read_all(&self, key: &str) -> Result<Vec<serde_json::Value>, RecordLogError> {
        (**self).read_all(key)
    }
}

/// Serialize and append a typed record.
pub fn append_record<T: Serialize>(log: &dyn RecordLog, key: &str, record: &T) -> Result<(), RecordLogError> {
    log.append(key, serde_json::to_value(record)?)
}

/// Read every record under `key` back into `T`.
pub fn read_records<T: DeserializeOwned>(log: &dyn RecordLog, key: &str) -> Result<Vec<T>, RecordLogError> {
    log.read_all(key)?
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(RecordLogError::from))
        .collect()
}

pub(crate) fn validate_key(key: &str) -> Result<(), RecordLogError> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(RecordLogError::InvalidKey(key.to_string()))
    }
}
