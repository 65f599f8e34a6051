//! The static agent table.
//!
//! Eight specialists, one served by speech transcription and seven by the
//! generative model. The table is built once and read for the lifetime of
//! the process.

use reasoncare_contracts::{
    agent::{AgentCapability, AgentDescriptor, AgentId},
    error::{ReasonCareError, ReasonCareResult},
};

/// Model reference used by every generative agent.
pub const CLINICAL_MODEL_REF: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Model reference of the transcription agent.
pub const TRANSCRIBE_MODEL_REF: &str = "amazon.transcribe";

/// Agents used when a request names none.
pub const DEFAULT_AGENT_IDS: [&str; 3] = ["cardiologist_agent", "reasoning_agent", "pov_summary_agent"];

// (id, capability, role, specialization)
const BUILTIN_AGENTS: [(&str, AgentCapability, &str, &str); 8] = [
    (
        "voice_agent",
        AgentCapability::SpeechTranscription,
        "Convert voice input to structured text",
        "voice_processing",
    ),
    (
        "cardiologist_agent",
        AgentCapability::GenerativeModel,
        "Primary cardiology diagnostic assessment",
        "cardiology",
    ),
    (
        "reasoning_agent",
        AgentCapability::GenerativeModel,
        "Clinical reasoning and explanation generation",
        "clinical_reasoning",
    ),
    (
        "pov_summary_agent",
        AgentCapability::GenerativeModel,
        "Multi-agent synthesis and point-of-view summary",
        "synthesis",
    ),
    (
        "electrophysiology_agent",
        AgentCapability::GenerativeModel,
        "ECG analysis and rhythm interpretation",
        "electrophysiology",
    ),
    (
        "report_summary_agent",
        AgentCapability::GenerativeModel,
        "Clinical report generation and formatting",
        "reporting",
    ),
    (
        "interventional_cardiologist_agent",
        AgentCapability::GenerativeModel,
        "Interventional procedure recommendations",
        "interventional_cardiology",
    ),
    (
        "heart_failure_specialist_agent",
        AgentCapability::GenerativeModel,
        "Heart failure specific diagnostic algorithms",
        "heart_failure",
    ),
];

/// Lookup table from agent id to descriptor, plus the default set.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentDescriptor>,
    default_set: Vec<AgentId>,
}

impl AgentRegistry {
    /// Build a registry from an explicit table.
    ///
    /// Every id in `default_set` must be present in `agents`.
    pub fn new(agents: Vec<AgentDescriptor>, default_set: Vec<AgentId>) -> ReasonCareResult<Self> {
        if let Some(missing) = default_set
            .iter()
            .find(|id| !agents.iter().any(|a| &a.id == *id))
        {
            return Err(ReasonCareError::ConfigError {
                reason: format!("default agent '{}' is not registered", missing.0),
            });
        }
        Ok(Self { agents, default_set })
    }

    /// The built-in eight-agent table with the three-agent default set.
    pub fn builtin() -> Self {
        let agents = BUILTIN_AGENTS
            .iter()
            .map(|(id, capability, role, specialization)| AgentDescriptor {
                id: AgentId::new(*id),
                capability: *capability,
                model_ref: match capability {
                    AgentCapability::GenerativeModel => CLINICAL_MODEL_REF.to_string(),
                    AgentCapability::SpeechTranscription => TRANSCRIBE_MODEL_REF.to_string(),
                },
                role: role.to_string(),
                specialization: specialization.to_string(),
            })
            .collect();
        let default_set = DEFAULT_AGENT_IDS.iter().map(|id| AgentId::new(*id)).collect();
        Self { agents, default_set }
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn default_set(&self) -> &[AgentId] {
        &self.default_set
    }

    pub fn all(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.iter()
    }

    /// Turn a requested id list into descriptors, in request order.
    ///
    /// An empty list selects the default set. Unknown ids are a validation
    /// error naming every one of them.
    pub fn resolve(&self, requested: &[AgentId]) -> ReasonCareResult<Vec<AgentDescriptor>> {
        let ids = if requested.is_empty() { &self.default_set[..] } else { requested };

        let unknown: Vec<&str> = ids
            .iter()
            .filter(|id| self.get(id).is_none())
            .map(AgentId::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(ReasonCareError::validation(format!(
                "unknown agent(s): {}",
                unknown.join(", ")
            )));
        }

        Ok(ids.iter().filter_map(|id| self.get(id).cloned()).collect())
    }
}
