//! Request body validation for the ReasonCare gateway.
//!
//! `RequestValidator` compiles every `RequestSchema` document once and
//! checks bodies against them. All violations are collected before
//! returning, so a caller sees the full set in one error instead of fixing
//! them one at a time.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};

use crate::schemas::RequestSchema;

/// Compiled validators for every known request schema.
pub struct RequestValidator {
    validators: HashMap<RequestSchema, jsonschema::Validator>,
}

impl RequestValidator {
    /// Compile all built-in schemas.
    ///
    /// Returns `ReasonCareError::ConfigError` if a schema document does not
    /// compile.
    pub fn new() -> ReasonCareResult<Self> {
        let mut validators = HashMap::new();
        for schema in RequestSchema::ALL {
            let validator = jsonschema::validator_for(&schema.document()).map_err(|e| {
                ReasonCareError::ConfigError {
                    reason: format!("invalid JSON Schema document '{}': {e}", schema.id()),
                }
            })?;
            validators.insert(schema, validator);
        }
        Ok(Self { validators })
    }

    /// Check `body` against `schema`.
    ///
    /// Returns `ReasonCareError::Validation` listing every violation, each
    /// prefixed by the JSON pointer of the offending value.
    pub fn validate(&self, schema: RequestSchema, body: &Value) -> ReasonCareResult<()> {
        let Some(validator) = self.validators.get(&schema) else {
            return Err(ReasonCareError::ConfigError {
                reason: format!("no validator compiled for '{}'", schema.id()),
            });
        };

        let violations: Vec<String> = validator
            .iter_errors(body)
            .map(|error| {
                let at = error.instance_path.to_string();
                if at.is_empty() {
                    error.to_string()
                } else {
                    format!("{at}: {error}")
                }
            })
            .collect();

        if violations.is_empty() {
            debug!(schema_id = schema.id(), "request body valid");
            return Ok(());
        }

        warn!(
            schema_id = schema.id(),
            violation_count = violations.len(),
            "request body rejected"
        );
        Err(ReasonCareError::validation(format!(
            "{} body rejected: {}",
            schema.id(),
            violations.join("; ")
        )))
    }
}

impl std::fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestValidator")
            .field("schemas", &self.validators.len())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use reasoncare_contracts::error::ReasonCareError;

    use super::RequestValidator;
    use crate::schemas::RequestSchema;

    fn reason(result: Result<(), ReasonCareError>) -> String {
        match result {
            Err(ReasonCareError::Validation { reason }) => reason,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    // ── Compilation ───────────────────────────────────────────────────────────

    /// Every built-in schema document must compile.
    #[test]
    fn test_all_schemas_compile() {
        let validator = RequestValidator::new().unwrap();
        assert!(format!("{validator:?}").contains("schemas: 5"));
    }

    // ── EHR write ─────────────────────────────────────────────────────────────

    /// Any object is a valid partial record; non-objects are not.
    #[test]
    fn test_ehr_write_requires_object() {
        let validator = RequestValidator::new().unwrap();
        assert!(validator
            .validate(RequestSchema::EhrWrite, &json!({"allergies": ["latex"]}))
            .is_ok());

        let message = reason(validator.validate(RequestSchema::EhrWrite, &json!(["not", "a", "map"])));
        assert!(message.starts_with("ehr-write body rejected"));
    }

    // ── Diagnosis update ──────────────────────────────────────────────────────

    /// Both missing required fields are reported in one error.
    #[test]
    fn test_diagnosis_update_reports_all_missing_fields() {
        let validator = RequestValidator::new().unwrap();
        let message = reason(validator.validate(RequestSchema::DiagnosisUpdate, &json!({})));
        assert!(message.contains("patientId"));
        assert!(message.contains("diagnosis"));
    }

    /// A wrong type is reported with the pointer of the offending value.
    #[test]
    fn test_diagnosis_update_reports_pointer() {
        let validator = RequestValidator::new().unwrap();
        let message = reason(validator.validate(
            RequestSchema::DiagnosisUpdate,
            &json!({"patientId": 42, "diagnosis": "NSTEMI"}),
        ));
        assert!(message.contains("/patientId"));
    }

    // ── Voice intake ──────────────────────────────────────────────────────────

    /// Either `audio` or `mediaUri` satisfies the intake schema.
    #[test]
    fn test_voice_intake_accepts_either_source() {
        let validator = RequestValidator::new().unwrap();
        assert!(validator
            .validate(RequestSchema::VoiceIntake, &json!({"audio": "UklGRg=="}))
            .is_ok());
        assert!(validator
            .validate(RequestSchema::VoiceIntake, &json!({"mediaUri": "s3://b/k.wav"}))
            .is_ok());
        assert!(validator
            .validate(RequestSchema::VoiceIntake, &json!({"language": "en-US"}))
            .is_err());
    }

    // ── Diagnosis generate ────────────────────────────────────────────────────

    /// Agent lists must hold strings.
    #[test]
    fn test_generate_agents_must_be_strings() {
        let validator = RequestValidator::new().unwrap();
        assert!(validator
            .validate(
                RequestSchema::DiagnosisGenerate,
                &json!({"agents": ["cardiologist_agent"], "patientData": {"age": 61}}),
            )
            .is_ok());

        let message = reason(validator.validate(RequestSchema::DiagnosisGenerate, &json!({"agents": [1]})));
        assert!(message.contains("/agents/0"));
    }
}
