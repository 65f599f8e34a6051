//! Multi-agent diagnosis orchestration.
//!
//! `AgentOrchestrator::run` resolves the requested agents, spawns one task
//! per agent, waits for every task to settle, and aggregates the results:
//!
//!   DiagnosticRequest → resolve agents → spawn N tasks → join all → aggregate
//!
//! One agent failing never aborts its siblings; it becomes a `Failed`
//! result. Only when no agent produces a scored result does the whole run
//! fail. Cancelling the caller's token, or dropping the `run` future,
//! cancels every in-flight agent task.

pub mod aggregate;
pub mod findings;
pub mod prompt;
pub mod registry;

use std::{sync::Arc, time::Instant};

use futures::future::join_all;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reasoncare_contracts::{
    agent::{AgentCapability, AgentDescriptor, AgentId, AgentResult, DiagnosticRequest, DiagnosticResult},
    capability::MetricUnit,
    error::{ReasonCareError, ReasonCareResult},
};

use crate::{
    audio::audio_from_payload,
    metrics::emit_detached,
    traits::{GenerativeModelInvocation, MetricsSink, SpeechTranscription},
};

pub use aggregate::aggregate;
pub use findings::{parse_model_response, Finding};
pub use prompt::agent_prompt;
pub use registry::AgentRegistry;

/// Fans diagnostic requests out to model-backed agents.
#[derive(Clone)]
pub struct AgentOrchestrator {
    registry: Arc<AgentRegistry>,
    backends: AgentBackends,
}

/// The capabilities one agent task may call. Cloned into every task.
#[derive(Clone)]
struct AgentBackends {
    models: Arc<dyn GenerativeModelInvocation>,
    transcription: Arc<dyn SpeechTranscription>,
    metrics: Arc<dyn MetricsSink>,
}

impl AgentOrchestrator {
    pub fn new(
        registry: AgentRegistry,
        models: Arc<dyn GenerativeModelInvocation>,
        transcription: Arc<dyn SpeechTranscription>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            backends: AgentBackends { models, transcription, metrics },
        }
    }

    /// Run one diagnosis across the requested (or default) agents.
    ///
    /// # Errors
    ///
    /// - `Validation` when an unknown agent id is requested
    /// - `Cancelled` when `cancel` fired before the join completed
    /// - `AggregationFailure` when no agent produced a scored result
    pub async fn run(
        &self,
        request: DiagnosticRequest,
        cancel: &CancellationToken,
    ) -> ReasonCareResult<DiagnosticResult> {
        let agents = self.registry.resolve(&request.requested_agents)?;
        let started = Instant::now();
        let labels: Vec<(AgentId, AgentCapability)> =
            agents.iter().map(|a| (a.id.clone(), a.capability)).collect();

        info!(
            agents = ?labels.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>(),
            "fanning out diagnostic request"
        );

        // Child token: cancelled by the caller's token, or by the guard when
        // this future is dropped before the join completes.
        let token = cancel.child_token();
        let _abandon_guard = token.clone().drop_guard();
        let payload = Arc::new(request.patient_payload);

        let handles: Vec<_> = agents
            .into_iter()
            .map(|agent| {
                let backends = self.backends.clone();
                let payload = Arc::clone(&payload);
                let token = token.clone();
                tokio::spawn(async move { backends.run_agent(agent, &payload, &token).await })
            })
            .collect();

        // Join barrier: every task settles before anything is aggregated.
        let joined = join_all(handles).await;

        let results: Vec<AgentResult> = joined
            .into_iter()
            .zip(labels)
            .map(|(outcome, (id, capability))| match outcome {
                Ok(result) => result,
                Err(e) => AgentResult::failed(id, capability, format!("agent task aborted: {e}")),
            })
            .collect();

        if cancel.is_cancelled() {
            return Err(ReasonCareError::Cancelled);
        }

        let completed = results.iter().filter(|r| r.is_completed()).count();
        info!(
            completed,
            failed = results.len() - completed,
            duration_ms = started.elapsed().as_millis() as u64,
            "diagnostic fan-out settled"
        );

        let diagnosis = aggregate(results)?;
        emit_detached(
            &self.backends.metrics,
            "DiagnosisConfidence",
            f64::from(diagnosis.confidence),
            MetricUnit::Percent,
        );
        Ok(diagnosis)
    }
}

impl AgentBackends {
    /// Invoke one agent. Never fails: errors become a `Failed` result.
    async fn run_agent(&self, agent: AgentDescriptor, payload: &Value, cancel: &CancellationToken) -> AgentResult {
        emit_detached(
            &self.metrics,
            format!("Agent.{}.Invocations", agent.id.as_str()),
            1.0,
            MetricUnit::Count,
        );

        let id = agent.id.clone();
        let capability = agent.capability;

        let outcome = tokio::select! {
            _ = cancel.cancelled() => Err(ReasonCareError::Cancelled),
            outcome = self.dispatch(&agent, payload) => outcome,
        };

        match outcome {
            Ok(result) => {
                debug!(agent_id = %id.as_str(), status = ?result.status, "agent settled");
                result
            }
            Err(err) => {
                warn!(agent_id = %id.as_str(), error = %err, "agent invocation failed");
                AgentResult::failed(id, capability, err.to_string())
            }
        }
    }

    async fn dispatch(&self, agent: &AgentDescriptor, payload: &Value) -> ReasonCareResult<AgentResult> {
        match agent.capability {
            AgentCapability::GenerativeModel => {
                let prompt = agent_prompt(agent, payload);
                let output = self.models.invoke(&agent.model_ref, &prompt).await?;
                let finding = parse_model_response(&output.text);

                Ok(match finding.confidence {
                    Some(confidence) if !finding.text.is_empty() => AgentResult::completed(
                        agent.id.clone(),
                        agent.capability,
                        finding.text,
                        confidence,
                    ),
                    Some(_) => AgentResult::failed(
                        agent.id.clone(),
                        agent.capability,
                        "model response carried no finding",
                    ),
                    None => AgentResult::failed(
                        agent.id.clone(),
                        agent.capability,
                        "model response carried no confidence score",
                    ),
                })
            }
            AgentCapability::SpeechTranscription => {
                let audio = audio_from_payload(payload)?;
                let job = self.transcription.submit(audio).await?;
                Ok(AgentResult::completed(
                    agent.id.clone(),
                    agent.capability,
                    format!("transcription job {} {}", job.job_id, job.status.as_str()),
                    0,
                ))
            }
        }
    }
}
