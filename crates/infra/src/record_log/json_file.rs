use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{RecordLog, RecordLogError, validate_key};

/// Record log backed by one JSON array file per key in a directory.
///
/// Appends rewrite the whole file through a temp file + rename, so a crash
/// leaves either the old or the new array on disk. Each append therefore
/// costs I/O proportional to the key's log size, paid while the caller holds
/// the inventory lock; suited to the small logs of a single storefront.
#[derive(Debug)]
pub struct JsonFileRecordLog {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRecordLog {
    /// Open (and create if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RecordLogError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load(&self, path: &Path) -> Result<Vec<serde_json::Value>, RecordLogError> {
        match fs::read(path) {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordLog for JsonFileRecordLog {
    fn append(&self, key: &str, record: serde_json::Value) -> Result<(), RecordLogError> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().map_err(|_| RecordLogError::Poisoned)?;

        let path = self.path_for(key);
        let mut records = self.load(&path)?;
        records.push(record);

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer(&mut file, &records)?;
            file.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read_all(&self, key: &str) -> Result<Vec<serde_json::Value>, RecordLogError> {
        validate_key(key)?;
        let _guard = self.write_lock.lock().map_err(|_| RecordLogError::Poisoned)?;
        self.load(&self.path_for(key))
    }
}
