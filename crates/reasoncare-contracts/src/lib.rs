//! # reasoncare-contracts
//!
//! Shared types for the ReasonCare gateway: request descriptors, the
//! response envelope, diagnostic agent data, patient records, capability
//! payloads, and the unified error type.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate; only data definitions, constructors and error types.

pub mod agent;
pub mod capability;
pub mod envelope;
pub mod error;
pub mod patient;
pub mod request;

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;
    use agent::{AgentCapability, AgentId, AgentResult, DiagnosticRequest};
    use envelope::ResponseEnvelope;
    use error::ReasonCareError;
    use patient::PatientRecord;
    use request::{Method, RequestBody, RequestDescriptor};

    // ── ResponseEnvelope wire shape ──────────────────────────────────────────

    #[test]
    fn envelope_ok_serializes_contract_field_names() {
        let env = ResponseEnvelope::ok(json!({ "a": 1 }), "done");
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"], json!({ "a": 1 }));
        assert_eq!(value["message"], json!("done"));
        // Absent optionals are omitted, not null.
        assert!(value.get("error").is_none());
        assert!(value.get("path").is_none());
    }

    #[test]
    fn envelope_failure_with_request_echoes_path_and_method() {
        let env = ResponseEnvelope::failure(None, "Endpoint not implemented in demo mode")
            .with_request("/api/unknown", Method::Get);
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["success"], json!(false));
        assert_eq!(value["path"], json!("/api/unknown"));
        assert_eq!(value["method"], json!("GET"));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn bare_success_is_only_success() {
        let value = serde_json::to_value(ResponseEnvelope::bare_success()).unwrap();
        assert_eq!(value, json!({ "success": true }));
    }

    // ── Method ───────────────────────────────────────────────────────────────

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!(" Put ".parse::<Method>().unwrap(), Method::Put);
        assert!(matches!(
            "PATCH".parse::<Method>(),
            Err(ReasonCareError::Validation { .. })
        ));
    }

    // ── RequestBody / RequestDescriptor ──────────────────────────────────────

    #[test]
    fn byte_body_parses_as_json() {
        let body = RequestBody::Bytes(br#"{"note":"x"}"#.to_vec());
        assert_eq!(body.to_json().unwrap(), json!({ "note": "x" }));
    }

    #[test]
    fn unparsable_byte_body_is_validation_error() {
        let body = RequestBody::Bytes(b"{not json".to_vec());
        let err = body.to_json().unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn whitespace_body_is_empty() {
        let body = RequestBody::Bytes(b"  \n".to_vec());
        assert!(body.is_empty());
        assert_eq!(body.to_json().unwrap(), Value::Null);
        assert_eq!(body.to_bytes().unwrap(), None);
    }

    #[test]
    fn route_path_strips_query() {
        let req = RequestDescriptor::get("/api/guidelines?version=2.1.3");
        assert_eq!(req.route_path(), "/api/guidelines");
        assert_eq!(req.path, "/api/guidelines?version=2.1.3");
    }

    // ── PatientRecord ────────────────────────────────────────────────────────

    #[test]
    fn patient_merge_overwrites_and_retains() {
        let mut record = PatientRecord::new("P1");
        let mut first = Map::new();
        first.insert("note".into(), json!("x"));
        first.insert("allergy".into(), json!("penicillin"));
        record.merge(first);

        let mut second = Map::new();
        second.insert("note".into(), json!("y"));
        record.merge(second);

        assert_eq!(record.to_json(), json!({ "note": "y", "allergy": "penicillin" }));
    }

    // ── Agent data ───────────────────────────────────────────────────────────

    #[test]
    fn agent_result_serializes_camel_case() {
        let result = AgentResult::completed(
            AgentId::new("cardiologist_agent"),
            AgentCapability::GenerativeModel,
            "Unstable angina",
            89,
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["agentId"], json!("cardiologist_agent"));
        assert_eq!(value["findingText"], json!("Unstable angina"));
        assert_eq!(value["confidenceScore"], json!(89));
        assert_eq!(value["status"], json!("completed"));
        assert_eq!(value["capability"], json!("generative_model"));
    }

    #[test]
    fn completed_confidence_is_clamped() {
        let result = AgentResult::completed(
            AgentId::new("a"),
            AgentCapability::GenerativeModel,
            "x",
            140,
        );
        assert_eq!(result.confidence_score, 100);
    }

    #[test]
    fn failed_agent_has_no_finding() {
        let result = AgentResult::failed(
            AgentId::new("a"),
            AgentCapability::GenerativeModel,
            "timeout",
        );
        assert!(!result.is_completed());
        assert!(result.finding_text.is_none());
        assert_eq!(result.confidence_score, 0);
    }

    #[test]
    fn diagnostic_request_defaults_to_no_agents() {
        let req: DiagnosticRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.requested_agents.is_empty());
        assert_eq!(req.patient_payload, Value::Null);
    }

    // ── ReasonCareError ──────────────────────────────────────────────────────

    #[test]
    fn unmapped_endpoint_display_says_not_implemented() {
        let err = ReasonCareError::UnmappedEndpoint {
            path: "/api/unknown".into(),
            method: Method::Get,
        };
        assert_eq!(err.to_string(), "Endpoint not implemented in demo mode");
    }

    #[test]
    fn transport_relabels_as_capability() {
        let err = ReasonCareError::Transport {
            reason: "connection refused".into(),
        }
        .into_capability("knowledge-retrieval");
        let msg = err.to_string();
        assert!(msg.contains("knowledge-retrieval"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn validation_is_not_relabelled() {
        let err = ReasonCareError::validation("bad").into_capability("document-store");
        assert!(matches!(err, ReasonCareError::Validation { .. }));
    }
}
