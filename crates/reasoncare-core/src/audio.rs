//! Extraction of audio references from JSON request payloads.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use reasoncare_contracts::{
    capability::AudioInput,
    error::{ReasonCareError, ReasonCareResult},
};

/// Read audio from a payload object.
///
/// Accepts `mediaUri` (an already-stored media location) or `audio`
/// (base64-encoded bytes). `mediaUri` wins when both are present.
pub fn audio_from_payload(payload: &Value) -> ReasonCareResult<AudioInput> {
    if let Some(uri) = payload.get("mediaUri").and_then(Value::as_str) {
        if uri.trim().is_empty() {
            return Err(ReasonCareError::validation("mediaUri must not be empty"));
        }
        return Ok(AudioInput::Uri(uri.to_string()));
    }

    match payload.get("audio").and_then(Value::as_str) {
        Some(encoded) => STANDARD
            .decode(encoded.trim())
            .map(AudioInput::Inline)
            .map_err(|e| ReasonCareError::validation(format!("audio is not valid base64: {e}"))),
        None => Err(ReasonCareError::validation(
            "payload must carry `audio` (base64) or `mediaUri`",
        )),
    }
}
