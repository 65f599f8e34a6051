//! Folding per-agent results into one diagnosis.
//!
//! Aggregation rule, applied to the scored results (generative agents whose
//! status is `Completed`):
//!
//! - `primary_diagnosis`: finding of the highest-confidence result; ties go
//!   to the agent listed first.
//! - `confidence`: arithmetic mean of the scored confidences, rounded to
//!   the nearest integer.
//! - `differential`: findings of the remaining scored results, by
//!   descending confidence (list order on ties).
//!
//! Transcription agents are reported but never scored. With no scored
//! result the aggregation fails.

use reasoncare_contracts::{
    agent::{AgentCapability, AgentResult, DiagnosticResult},
    error::{ReasonCareError, ReasonCareResult},
};

pub fn aggregate(results: Vec<AgentResult>) -> ReasonCareResult<DiagnosticResult> {
    let mut scored: Vec<&AgentResult> = results
        .iter()
        .filter(|r| r.is_completed() && r.capability == AgentCapability::GenerativeModel)
        .collect();

    if scored.is_empty() {
        return Err(ReasonCareError::AggregationFailure {
            reason: "no agent succeeded".to_string(),
        });
    }

    // Stable sort keeps list order among equal confidences.
    scored.sort_by(|a, b| b.confidence_score.cmp(&a.confidence_score));

    let total: u32 = scored.iter().map(|r| u32::from(r.confidence_score)).sum();
    let confidence = (f64::from(total) / scored.len() as f64).round() as u8;

    let finding = |r: &&AgentResult| r.finding_text.clone().unwrap_or_default();
    let primary_diagnosis = finding(&scored[0]);
    let differential = scored[1..].iter().map(finding).collect();

    Ok(DiagnosticResult {
        primary_diagnosis,
        confidence,
        per_agent_results: results,
        differential,
    })
}
