//! The clinical workflow as a fixed sequence of gateway calls.
//!
//! Stages follow a patient from intake to guideline feedback: intake, EHR
//! view, diagnosis, resident review, senior review, feedback loop.

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use reasoncare_contracts::{envelope::ResponseEnvelope, request::RequestDescriptor};
use reasoncare_core::Gateway;

/// One call in the walkthrough.
#[derive(Debug, Clone)]
pub struct Step {
    pub stage: &'static str,
    pub request: RequestDescriptor,
}

/// An executed step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub stage: &'static str,
    pub request: RequestDescriptor,
    pub envelope: ResponseEnvelope,
}

pub fn steps(patient_id: &str) -> Vec<Step> {
    let step = |stage, request| Step { stage, request };
    vec![
        step(
            "Patient Intake",
            RequestDescriptor::post(
                "/api/intake/voice",
                json!({ "mediaUri": format!("s3://reasoncare-media/intake/{patient_id}.wav") }),
            ),
        ),
        step("EHR View", RequestDescriptor::get(format!("/api/ehr/{patient_id}"))),
        step(
            "Diagnosis",
            RequestDescriptor::post(
                "/api/diagnosis/generate",
                json!({
                    "patientData": {
                        "patientId": patient_id,
                        "chiefComplaint": "Chest pain radiating to the left arm, 2 hours",
                        "vitals": { "bloodPressure": "150/95", "heartRate": 102 }
                    }
                }),
            ),
        ),
        step(
            "Resident Review",
            RequestDescriptor::put(
                "/api/diagnosis/update",
                json!({
                    "patientId": patient_id,
                    "diagnosis": "Unstable Angina Pectoris",
                    "updatedBy": "Dr. Michael Chen, PGY-3"
                }),
            ),
        ),
        step(
            "Senior Review",
            RequestDescriptor::post(
                "/api/diagnosis/approve",
                json!({ "patientId": patient_id, "reviewedBy": "Dr. Sarah Williams, MD" }),
            ),
        ),
        step(
            "Feedback Loop",
            RequestDescriptor::post(
                "/api/guidelines/update",
                json!({ "feedback": "Earlier troponin trending for diabetic patients with atypical chest pain" }),
            ),
        ),
    ]
}

/// Run every step in order, stopping early if `cancel` fires.
///
/// Failed steps do not stop the walkthrough; their envelopes are returned
/// like any other.
pub async fn run(gateway: &Gateway, patient_id: &str, cancel: &CancellationToken) -> Vec<StepOutcome> {
    let mut outcomes = Vec::new();
    for Step { stage, request } in steps(patient_id) {
        if cancel.is_cancelled() {
            break;
        }
        let envelope = gateway.call_with_cancel(request.clone(), cancel.child_token()).await;
        info!(stage, success = envelope.success, "walkthrough step finished");
        outcomes.push(StepOutcome {
            stage,
            request,
            envelope,
        });
    }
    outcomes
}
