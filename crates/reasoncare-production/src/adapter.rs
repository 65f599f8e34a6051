//! The production-mode request handler.
//!
//! Maps each route onto capability calls:
//!
//! | Route                      | Capability                                   |
//! |----------------------------|----------------------------------------------|
//! | `POST /api/intake/voice`   | `SpeechTranscription::submit`                |
//! | `GET /api/intake/voice/{j}`| `SpeechTranscription::poll`                  |
//! | `GET /api/ehr/{id}`        | `DocumentStore::get`                         |
//! | `PUT /api/ehr/{id}`        | `DocumentStore::merge_put`                   |
//! | `POST /api/diagnosis/generate` | `AgentOrchestrator::run`                 |
//! | `PUT /api/diagnosis/update`| `DocumentStore::merge_put` (bare success)    |
//! | `POST /api/guidelines/update` | `KnowledgeRetrieval::query`               |
//! | anything else              | `PassthroughClient::forward`                 |
//!
//! Capability errors are returned as-is for the gateway to render; nothing
//! is retried.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use reasoncare_contracts::{
    agent::{AgentId, DiagnosticRequest},
    envelope::ResponseEnvelope,
    error::{ReasonCareError, ReasonCareResult},
    request::RequestDescriptor,
};
use reasoncare_core::{
    audio::audio_from_payload,
    traits::{DocumentStore, KnowledgeRetrieval, PassthroughClient, RequestHandler, SpeechTranscription},
    AgentOrchestrator, Route,
};
use reasoncare_verify::{RequestSchema, RequestValidator};

const DEFAULT_UPDATED_BY: &str = "clinician";

/// Dispatches routes to live backends.
pub struct ProductionAdapter {
    orchestrator: AgentOrchestrator,
    transcription: Arc<dyn SpeechTranscription>,
    documents: Arc<dyn DocumentStore>,
    knowledge: Arc<dyn KnowledgeRetrieval>,
    passthrough: Arc<dyn PassthroughClient>,
    validator: RequestValidator,
}

impl ProductionAdapter {
    pub fn new(
        orchestrator: AgentOrchestrator,
        transcription: Arc<dyn SpeechTranscription>,
        documents: Arc<dyn DocumentStore>,
        knowledge: Arc<dyn KnowledgeRetrieval>,
        passthrough: Arc<dyn PassthroughClient>,
    ) -> ReasonCareResult<Self> {
        Ok(Self {
            orchestrator,
            transcription,
            documents,
            knowledge,
            passthrough,
            validator: RequestValidator::new()?,
        })
    }

    /// Parse the body and check it against `schema`.
    fn structured_body(&self, request: &RequestDescriptor, schema: RequestSchema) -> ReasonCareResult<Value> {
        let body = request.body.to_json()?;
        self.validator.validate(schema, &body)?;
        Ok(body)
    }

    async fn voice_intake(&self, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let body = self.structured_body(request, RequestSchema::VoiceIntake)?;
        let audio = audio_from_payload(&body)?;
        let job = self.transcription.submit(audio).await?;
        Ok(ResponseEnvelope::ok(
            json!({ "jobId": job.job_id, "status": job.status }),
            "Voice input submitted for transcription",
        ))
    }

    async fn voice_status(&self, job_id: &str) -> ReasonCareResult<ResponseEnvelope> {
        let result = self.transcription.poll(job_id).await?;
        Ok(ResponseEnvelope::ok(
            json!({
                "jobId": job_id,
                "status": result.status,
                "transcriptRef": result.transcript_ref
            }),
            "Transcription status retrieved",
        ))
    }

    async fn ehr_read(&self, patient_id: &str) -> ReasonCareResult<ResponseEnvelope> {
        match self.documents.get(patient_id).await? {
            Some(record) => Ok(ResponseEnvelope::ok(record, "EHR data retrieved successfully")),
            None => Ok(ResponseEnvelope::failure(
                Some("Patient record not found".to_string()),
                format!("no EHR record for patient '{patient_id}'"),
            )),
        }
    }

    async fn ehr_write(&self, patient_id: &str, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let partial = into_object(self.structured_body(request, RequestSchema::EhrWrite)?)?;
        let merged = self.documents.merge_put(patient_id, partial).await?;
        Ok(ResponseEnvelope::ok(merged, "EHR data updated successfully"))
    }

    async fn diagnosis_generate(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ReasonCareResult<ResponseEnvelope> {
        // A bodiless request runs the default agents on an empty payload.
        let body = if request.body.is_empty() {
            json!({})
        } else {
            self.structured_body(request, RequestSchema::DiagnosisGenerate)?
        };

        let requested_agents = body
            .get("agents")
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).map(AgentId::new).collect())
            .unwrap_or_default();
        let patient_payload = body.get("patientData").cloned().unwrap_or(body);

        let diagnosis = self
            .orchestrator
            .run(
                DiagnosticRequest {
                    patient_payload,
                    requested_agents,
                },
                cancel,
            )
            .await?;

        info!(
            primary = %diagnosis.primary_diagnosis,
            confidence = diagnosis.confidence,
            "diagnosis generated"
        );
        let data = serde_json::to_value(&diagnosis).map_err(|e| ReasonCareError::AggregationFailure {
            reason: format!("could not encode diagnosis: {e}"),
        })?;
        Ok(ResponseEnvelope::ok(data, "Diagnosis generated successfully"))
    }

    async fn diagnosis_update(&self, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let body = self.structured_body(request, RequestSchema::DiagnosisUpdate)?;
        let patient_id = body["patientId"].as_str().unwrap_or_default().to_string();
        let updated_by = body
            .get("updatedBy")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_UPDATED_BY);

        let mut partial = Map::new();
        partial.insert("diagnosis".to_string(), body["diagnosis"].clone());
        partial.insert("updatedBy".to_string(), json!(updated_by));
        partial.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));

        self.documents.merge_put(&patient_id, partial).await?;
        debug!(patient_id = %patient_id, "diagnosis update stored");
        Ok(ResponseEnvelope::bare_success())
    }

    async fn guidelines_update(&self, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let body = self.structured_body(request, RequestSchema::GuidelinesUpdate)?;
        let query = ["query", "feedback"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        let found = self.knowledge.query(&query).await?;
        Ok(ResponseEnvelope::ok(
            json!({ "results": found.results, "sources": found.sources }),
            "Guidelines retrieved successfully",
        ))
    }
}

#[async_trait]
impl RequestHandler for ProductionAdapter {
    fn name(&self) -> &'static str {
        "production"
    }

    async fn handle(
        &self,
        route: Route,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ReasonCareResult<ResponseEnvelope> {
        match route {
            Route::VoiceIntake => self.voice_intake(request).await,
            Route::VoiceIntakeStatus { job_id } => self.voice_status(&job_id).await,
            Route::EhrRead { patient_id } => self.ehr_read(&patient_id).await,
            Route::EhrWrite { patient_id } => self.ehr_write(&patient_id, request).await,
            Route::DiagnosisGenerate => self.diagnosis_generate(request, cancel).await,
            Route::DiagnosisUpdate => self.diagnosis_update(request).await,
            Route::GuidelinesUpdate => self.guidelines_update(request).await,
            Route::DiagnosisApprove | Route::DiagnosisReject | Route::Unmapped => {
                self.passthrough.forward(request).await
            }
        }
    }
}

fn into_object(body: Value) -> ReasonCareResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ReasonCareError::validation("request body must be a JSON object")),
    }
}
