//! JSON Schema documents for structured request bodies.

use serde_json::{json, Value};

/// A request body shape the gateway validates before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSchema {
    /// `PUT /api/ehr/{id}`: any JSON object of fields to merge.
    EhrWrite,
    /// `POST /api/intake/voice`: `audio` (base64) or `mediaUri`.
    VoiceIntake,
    /// `POST /api/diagnosis/generate`: optional `agents` list and `patientData`.
    DiagnosisGenerate,
    /// `PUT /api/diagnosis/update`: `patientId` and `diagnosis` required.
    DiagnosisUpdate,
    /// `POST /api/guidelines/update`: optional `query` / `feedback` text.
    GuidelinesUpdate,
}

impl RequestSchema {
    pub const ALL: [RequestSchema; 5] = [
        RequestSchema::EhrWrite,
        RequestSchema::VoiceIntake,
        RequestSchema::DiagnosisGenerate,
        RequestSchema::DiagnosisUpdate,
        RequestSchema::GuidelinesUpdate,
    ];

    /// Stable id used in logs and error messages.
    pub fn id(&self) -> &'static str {
        match self {
            RequestSchema::EhrWrite => "ehr-write",
            RequestSchema::VoiceIntake => "voice-intake",
            RequestSchema::DiagnosisGenerate => "diagnosis-generate",
            RequestSchema::DiagnosisUpdate => "diagnosis-update",
            RequestSchema::GuidelinesUpdate => "guidelines-update",
        }
    }

    pub fn document(&self) -> Value {
        match self {
            RequestSchema::EhrWrite => json!({
                "type": "object"
            }),
            RequestSchema::VoiceIntake => json!({
                "type": "object",
                "properties": {
                    "audio": { "type": "string", "minLength": 1 },
                    "mediaUri": { "type": "string", "minLength": 1 }
                },
                "anyOf": [
                    { "required": ["audio"] },
                    { "required": ["mediaUri"] }
                ]
            }),
            RequestSchema::DiagnosisGenerate => json!({
                "type": "object",
                "properties": {
                    "agents": {
                        "type": "array",
                        "items": { "type": "string", "minLength": 1 }
                    },
                    "patientData": { "type": "object" }
                }
            }),
            RequestSchema::DiagnosisUpdate => json!({
                "type": "object",
                "required": ["patientId", "diagnosis"],
                "properties": {
                    "patientId": { "type": "string", "minLength": 1 },
                    "diagnosis": { "type": ["string", "object"] },
                    "updatedBy": { "type": "string" }
                }
            }),
            RequestSchema::GuidelinesUpdate => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "feedback": { "type": "string" }
                }
            }),
        }
    }
}
