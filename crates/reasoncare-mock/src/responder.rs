//! The demo-mode request handler.
//!
//! Every call first waits a simulated network delay drawn uniformly from
//! the configured range, then answers from the canned endpoint table.
//! Routes outside the table are `UnmappedEndpoint` errors, which the
//! gateway renders as a normal failure envelope.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use reasoncare_contracts::{
    envelope::ResponseEnvelope,
    error::{ReasonCareError, ReasonCareResult},
    request::RequestDescriptor,
};
use reasoncare_core::{traits::RequestHandler, Route};
use reasoncare_verify::{RequestSchema, RequestValidator};

use crate::fixtures::Fixtures;

pub const DEFAULT_LATENCY_MIN: Duration = Duration::from_millis(500);
pub const DEFAULT_LATENCY_MAX: Duration = Duration::from_millis(1500);

const REVIEWER: &str = "Dr. Sarah Williams, MD";
const RESIDENT: &str = "Dr. Michael Chen, PGY-3";
const DEMO_DIAGNOSIS: &str = "Unstable Angina Pectoris";

/// Serves canned responses with simulated latency.
pub struct DemoResponder {
    fixtures: Arc<Fixtures>,
    latency_min: Duration,
    latency_max: Duration,
    validator: RequestValidator,
}

impl DemoResponder {
    /// A responder over `fixtures` with the default 500–1500 ms delay.
    pub fn new(fixtures: Fixtures) -> ReasonCareResult<Self> {
        Ok(Self {
            fixtures: Arc::new(fixtures),
            latency_min: DEFAULT_LATENCY_MIN,
            latency_max: DEFAULT_LATENCY_MAX,
            validator: RequestValidator::new()?,
        })
    }

    /// Draw delays from `[min, max)` instead. `min >= max` pins the delay
    /// to `min`.
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.latency_min = min;
        self.latency_max = max;
        self
    }

    fn draw_latency(&self) -> Duration {
        if self.latency_min >= self.latency_max {
            return self.latency_min;
        }
        let min = self.latency_min.as_millis() as u64;
        let max = self.latency_max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..max))
    }

    fn respond(&self, route: Route, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let fixtures = &self.fixtures;
        let envelope = match route {
            Route::VoiceIntake => {
                ResponseEnvelope::ok(fixtures.symptoms.clone(), "Symptoms processed successfully")
            }
            Route::EhrRead { .. } => {
                ResponseEnvelope::ok(fixtures.ehr.clone(), "EHR data retrieved successfully")
            }
            Route::EhrWrite { .. } => {
                let body = request.body.to_json()?;
                self.validator.validate(RequestSchema::EhrWrite, &body)?;
                ResponseEnvelope::ok(merged_over(&fixtures.ehr, body), "EHR data updated successfully")
            }
            Route::DiagnosisGenerate => ResponseEnvelope::ok(
                json!({
                    "diagnosis": DEMO_DIAGNOSIS,
                    "confidence": 87,
                    "report": fixtures.diagnosis_v1,
                    "agents": [
                        { "name": "Cardiology Specialist", "confidence": 89, "status": "completed" },
                        { "name": "Emergency Medicine", "confidence": 85, "status": "completed" },
                        { "name": "Internal Medicine", "confidence": 78, "status": "completed" }
                    ]
                }),
                "Diagnosis generated successfully",
            ),
            Route::DiagnosisUpdate => ResponseEnvelope::ok(
                json!({
                    "diagnosis": DEMO_DIAGNOSIS,
                    "confidence": 89,
                    "report": fixtures.diagnosis_v2,
                    "modifiedBy": RESIDENT
                }),
                "Diagnosis updated successfully",
            ),
            Route::DiagnosisApprove => ResponseEnvelope::ok(
                json!({
                    "status": "approved",
                    "feedback": fixtures.doctor_feedback,
                    "reviewedBy": REVIEWER
                }),
                "Diagnosis approved successfully",
            ),
            Route::DiagnosisReject => ResponseEnvelope::ok(
                json!({
                    "status": "rejected",
                    "reason": "Requires additional workup",
                    "reviewedBy": REVIEWER
                }),
                "Diagnosis rejected - requires revision",
            ),
            Route::GuidelinesUpdate => ResponseEnvelope::ok(
                json!({
                    "version": "2.1.3",
                    "updatedGuidelines": fixtures.updated_guidelines,
                    "casesAffected": 156
                }),
                "Guidelines updated successfully",
            ),
            Route::VoiceIntakeStatus { .. } | Route::Unmapped => {
                return Err(ReasonCareError::UnmappedEndpoint {
                    path: request.path.clone(),
                    method: request.method,
                })
            }
        };
        Ok(envelope)
    }
}

#[async_trait]
impl RequestHandler for DemoResponder {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn handle(
        &self,
        route: Route,
        request: &RequestDescriptor,
        _cancel: &CancellationToken,
    ) -> ReasonCareResult<ResponseEnvelope> {
        let delay = self.draw_latency();
        debug!(
            route = route.name(),
            delay_ms = delay.as_millis() as u64,
            "simulating demo latency"
        );
        // Dropping this future (gateway cancellation) abandons the sleep.
        tokio::time::sleep(delay).await;

        self.respond(route, request)
    }
}

/// Shallow merge of `body` over a copy of `base`.
fn merged_over(base: &Value, body: Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Value::Object(fields) = body {
        merged.extend(fields);
    }
    Value::Object(merged)
}
