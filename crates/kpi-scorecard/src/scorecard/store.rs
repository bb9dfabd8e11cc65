use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// The dashboard keeps exactly one snapshot row.
pub const SNAPSHOT_KEY: u32 = 1;

/// Served when nothing has been saved yet.
pub const EMPTY_SNAPSHOT: &str = r#"{"data":{},"completions":{}}"#;

/// Verbatim snapshot blob plus the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSnapshot {
    pub key: u32,
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

impl StoredSnapshot {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            key: SNAPSHOT_KEY,
            payload: payload.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Storage abstraction for the single whole-year snapshot.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSnapshot>, StoreError>;
    fn save(&self, snapshot: StoredSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot payload is not a JSON object: {0}")]
    Malformed(String),
    #[error("snapshot file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Rejects anything other than a JSON object before it reaches a store.
pub fn validate_payload(payload: &str) -> Result<(), StoreError> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(_)) => Ok(()),
        Ok(other) => Err(StoreError::Malformed(format!(
            "expected an object, found {}",
            json_kind(&other)
        ))),
        Err(err) => Err(StoreError::Malformed(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slot: Mutex<Option<StoredSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(StoredSnapshot::new(payload))),
        }
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        let guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, snapshot: StoredSnapshot) -> Result<(), StoreError> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(snapshot);
        Ok(())
    }
}

/// Single JSON file holding the blob verbatim.
///
/// Writes go to a sibling temp file that is then renamed over the target, so a
/// reader sees either the old or the new blob.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<StoredSnapshot>, StoreError> {
        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        let updated_at = fs::metadata(&self.path)
            .and_then(|metadata| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Some(StoredSnapshot {
            key: SNAPSHOT_KEY,
            payload,
            updated_at,
        }))
    }

    fn save(&self, snapshot: StoredSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let staging = self.staging_path();
        fs::write(&staging, snapshot.payload.as_bytes()).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))?;

        info!(
            path = %self.path.display(),
            bytes = snapshot.payload.len(),
            "snapshot written"
        );
        Ok(())
    }
}
