use std::collections::HashMap;
use std::sync::RwLock;

use super::{RecordLog, RecordLogError, validate_key};

/// In-memory record log.
///
/// Used when no data directory is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordLog {
    records: RwLock<HashMap<String, Vec<serde_json::Value>>>,
}

impl InMemoryRecordLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordLog for InMemoryRecordLog {
    fn append(&self, key: &str, record: serde_json::Value) -> Result<(), RecordLogError> {
        validate_key(key)?;
        let mut records = self.records.write().map_err(|_| RecordLogError::Poisoned)?;
        records.entry(key.to_string()).or_default().push(record);
        Ok(())
    }

    fn read_all(&self, key: &str) -> Result<Vec<serde_json::Value>, RecordLogError> {
        validate_key(key)?;
        let records = self.records.read().map_err(|_| RecordLogError::Poisoned)?;
        Ok(records.get(key).cloned().unwrap_or_default())
    }
}
