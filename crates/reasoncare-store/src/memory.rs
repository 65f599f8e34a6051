//! In-process document store.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::debug;

use reasoncare_contracts::{error::ReasonCareResult, patient::PatientRecord};
use reasoncare_core::traits::DocumentStore;

use crate::validate_patient_id;

/// Patient records held in a concurrent map. Lost when the process exits.
///
/// A merge runs entirely under the map's entry lock for that key, so two
/// merges on one patient cannot interleave while merges on different
/// patients proceed independently.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: DashMap<String, PatientRecord>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, key: &str) -> ReasonCareResult<Option<Value>> {
        validate_patient_id(key)?;
        Ok(self.records.get(key).map(|record| record.to_json()))
    }

    async fn merge_put(&self, key: &str, partial: Map<String, Value>) -> ReasonCareResult<Value> {
        validate_patient_id(key)?;
        let fields = partial.len();

        let mut record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| PatientRecord::new(key));
        record.merge(partial);
        let merged = record.to_json();
        drop(record);

        debug!(patient_id = %key, fields, "merged patient record in memory");
        Ok(merged)
    }
}
