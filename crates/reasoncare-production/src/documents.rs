//! Patient records held by the remote EHR API.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;

use reasoncare_contracts::{
    error::{ReasonCareError, ReasonCareResult},
    patient::PatientRecord,
};
use reasoncare_core::traits::DocumentStore;
use reasoncare_store::{validate_patient_id, KeyedLocks};

use crate::http::{join_url, HttpTransport, OutboundBody};

const CAPABILITY: &str = "document_store";

/// Reads and writes `<baseUrl>/api/ehr/<id>`.
///
/// The remote API stores whole records, so merges are computed here:
/// GET, merge, PUT, all under this process's per-patient lock.
pub struct HttpDocumentStore {
    transport: HttpTransport,
    base_url: String,
    locks: KeyedLocks,
}

impl HttpDocumentStore {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            locks: KeyedLocks::new(),
        }
    }

    fn record_url(&self, key: &str) -> String {
        join_url(&self.base_url, &format!("api/ehr/{key}"))
    }

    async fn fetch(&self, key: &str) -> ReasonCareResult<Option<Map<String, Value>>> {
        let reply = self.transport.send(Method::GET, &self.record_url(key), None).await?;
        if reply.status == 404 {
            return Ok(None);
        }
        if !reply.is_success() {
            return Err(reply.status_error());
        }

        match unwrap_envelope(reply.json()?) {
            Value::Object(fields) => Ok(Some(fields)),
            Value::Null => Ok(None),
            other => Err(ReasonCareError::Capability {
                capability: CAPABILITY.to_string(),
                reason: format!("record for '{key}' is not a JSON object: {other}"),
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get(&self, key: &str) -> ReasonCareResult<Option<Value>> {
        validate_patient_id(key)?;
        let fields = self
            .fetch(key)
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;
        Ok(fields.map(Value::Object))
    }

    async fn merge_put(&self, key: &str, partial: Map<String, Value>) -> ReasonCareResult<Value> {
        validate_patient_id(key)?;
        let _guard = self.locks.lock(key).await;

        let mut record = PatientRecord::new(key);
        if let Some(existing) = self.fetch(key).await.map_err(|e| e.into_capability(CAPABILITY))? {
            record.fields = existing;
        }
        record.merge(partial);
        let merged = record.to_json();

        let reply = self
            .transport
            .send(Method::PUT, &self.record_url(key), Some(OutboundBody::Json(merged.clone())))
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;
        if !reply.is_success() {
            return Err(reply.status_error().into_capability(CAPABILITY));
        }

        debug!(patient_id = %key, "merged patient record remotely");
        Ok(merged)
    }
}

/// Accept either a bare record or one wrapped as `{success, data}`.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("success").is_some_and(Value::is_boolean) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
