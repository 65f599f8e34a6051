//! Diagnostic agent identity, requests and results.
//!
//! An "agent" here is a named, model-backed specialist. The orchestrator
//! fans a `DiagnosticRequest` out to several of them and folds their
//! `AgentResult`s into one `DiagnosticResult`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable identifier for an agent, e.g. `AgentId("cardiologist_agent")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which backend capability an agent is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCapability {
    GenerativeModel,
    SpeechTranscription,
}

/// One row of the static agent table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub capability: AgentCapability,
    /// Backend model identifier passed to the capability.
    pub model_ref: String,
    /// Human-readable role, e.g. "Primary cardiology diagnostic assessment".
    pub role: String,
    /// Specialization key that selects the prompt focus paragraph.
    pub specialization: String,
}

/// Input to the orchestrator.
///
/// An empty `requested_agents` means "use the default set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRequest {
    #[serde(default)]
    pub patient_payload: Value,
    #[serde(default)]
    pub requested_agents: Vec<AgentId>,
}

/// Terminal state of one agent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Completed,
    Failed,
}

/// The outcome of a single agent sub-invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub agent_id: AgentId,
    pub capability: AgentCapability,
    /// Absent when the agent failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding_text: Option<String>,
    /// 0–100. Zero for failed agents and for agents that are not scored.
    pub confidence_score: u8,
    pub status: AgentStatus,
    /// Why the agent failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentResult {
    pub fn completed(
        agent_id: AgentId,
        capability: AgentCapability,
        finding_text: impl Into<String>,
        confidence_score: u8,
    ) -> Self {
        Self {
            agent_id,
            capability,
            finding_text: Some(finding_text.into()),
            confidence_score: confidence_score.min(100),
            status: AgentStatus::Completed,
            error: None,
        }
    }

    pub fn failed(agent_id: AgentId, capability: AgentCapability, reason: impl Into<String>) -> Self {
        Self {
            agent_id,
            capability,
            finding_text: None,
            confidence_score: 0,
            status: AgentStatus::Failed,
            error: Some(reason.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AgentStatus::Completed
    }
}

/// The aggregate of one orchestrated diagnosis.
///
/// `primary_diagnosis`, `confidence` and `differential` are always derived
/// from `per_agent_results`; see the orchestrator's aggregation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    pub primary_diagnosis: String,
    pub confidence: u8,
    pub per_agent_results: Vec<AgentResult>,
    pub differential: Vec<String>,
}
