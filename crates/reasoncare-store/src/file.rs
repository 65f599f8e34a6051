//! Directory-backed document store: one JSON file per patient.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info};

use reasoncare_contracts::{
    error::{ReasonCareError, ReasonCareResult},
    patient::PatientRecord,
};
use reasoncare_core::traits::DocumentStore;

use crate::{locks::KeyedLocks, validate_patient_id};

const CAPABILITY: &str = "document_store";

/// Stores each record as `<dir>/patient_<id>.json`.
///
/// Merges take the per-patient lock for the whole read-modify-write and
/// replace the file through a rename, so readers never see a half-written
/// record.
#[derive(Debug)]
pub struct FileDocumentStore {
    dir: PathBuf,
    locks: KeyedLocks,
}

impl FileDocumentStore {
    /// Use `dir` as the record directory, creating it if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> ReasonCareResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, "create", e))?;
        info!(dir = %dir.display(), "file document store opened");
        Ok(Self {
            dir,
            locks: KeyedLocks::new(),
        })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("patient_{key}.json"))
    }

    async fn read_record(&self, key: &str) -> ReasonCareResult<Option<PatientRecord>> {
        let path = self.record_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, "read", e)),
        };

        let fields = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                return Err(ReasonCareError::Capability {
                    capability: CAPABILITY.to_string(),
                    reason: format!("'{}' does not hold a JSON object", path.display()),
                })
            }
            Err(e) => {
                return Err(ReasonCareError::Capability {
                    capability: CAPABILITY.to_string(),
                    reason: format!("'{}' is not valid JSON: {e}", path.display()),
                })
            }
        };

        Ok(Some(PatientRecord {
            patient_id: key.to_string(),
            fields,
        }))
    }

    async fn write_record(&self, record: &PatientRecord) -> ReasonCareResult<()> {
        let path = self.record_path(&record.patient_id);
        let staging = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(&record.to_json()).map_err(|e| ReasonCareError::Capability {
            capability: CAPABILITY.to_string(),
            reason: format!("could not encode record: {e}"),
        })?;

        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| io_error(&staging, "write", e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| io_error(&path, "replace", e))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, key: &str) -> ReasonCareResult<Option<Value>> {
        validate_patient_id(key)?;
        Ok(self.read_record(key).await?.map(|record| record.to_json()))
    }

    async fn merge_put(&self, key: &str, partial: Map<String, Value>) -> ReasonCareResult<Value> {
        validate_patient_id(key)?;
        let _guard = self.locks.lock(key).await;

        let mut record = self
            .read_record(key)
            .await?
            .unwrap_or_else(|| PatientRecord::new(key));
        record.merge(partial);
        self.write_record(&record).await?;

        debug!(patient_id = %key, dir = %self.dir.display(), "merged patient record on disk");
        Ok(record.to_json())
    }
}

fn io_error(path: &Path, action: &str, e: std::io::Error) -> ReasonCareError {
    ReasonCareError::Capability {
        capability: CAPABILITY.to_string(),
        reason: format!("failed to {action} '{}': {e}", path.display()),
    }
}
