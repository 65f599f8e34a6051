//! Trait seams of the ReasonCare gateway.
//!
//! Capability traits describe the external backends the gateway talks to:
//!
//! - `SpeechTranscription`: asynchronous transcription jobs
//! - `GenerativeModelInvocation`: single request/response model calls
//! - `DocumentStore`: keyed patient records with shallow merge
//! - `KnowledgeRetrieval`: guideline search
//! - `MetricsSink`: best-effort metric emission
//! - `PassthroughClient`: forwarding of unmapped endpoints
//!
//! `RequestHandler` is the strategy the gateway delegates to. There are two
//! implementations, demo and production; the gateway holds exactly one.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use reasoncare_contracts::{
    capability::{
        AudioInput, KnowledgeResults, MetricUnit, ModelOutput, TranscriptionJob,
        TranscriptionResult,
    },
    envelope::ResponseEnvelope,
    error::ReasonCareResult,
    request::RequestDescriptor,
};

use crate::routing::Route;

/// Speech-to-text backend. `submit` starts a job; it does not wait for it.
#[async_trait]
pub trait SpeechTranscription: Send + Sync {
    /// Start a transcription job and return its handle.
    async fn submit(&self, audio: AudioInput) -> ReasonCareResult<TranscriptionJob>;

    /// Look up the current state of a previously submitted job.
    async fn poll(&self, job_id: &str) -> ReasonCareResult<TranscriptionResult>;
}

/// Generative model backend.
#[async_trait]
pub trait GenerativeModelInvocation: Send + Sync {
    /// Send `prompt` to the model identified by `model_ref`.
    async fn invoke(&self, model_ref: &str, prompt: &str) -> ReasonCareResult<ModelOutput>;
}

/// Keyed JSON document storage for patient records.
///
/// Implementations must serialize `merge_put` calls per key: two concurrent
/// merges on the same key may not interleave their read-modify-write.
/// Different keys need no mutual exclusion.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the record for `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> ReasonCareResult<Option<Value>>;

    /// Shallow-merge `partial` into the record for `key`, creating it if
    /// absent, and return the merged record.
    async fn merge_put(&self, key: &str, partial: Map<String, Value>) -> ReasonCareResult<Value>;
}

/// Knowledge-base search over clinical guidelines.
#[async_trait]
pub trait KnowledgeRetrieval: Send + Sync {
    async fn query(&self, text: &str) -> ReasonCareResult<KnowledgeResults>;
}

/// Metric sink. Infallible by signature: implementations swallow and log
/// their own failures.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn emit(&self, name: &str, value: f64, unit: MetricUnit);
}

/// Generic HTTP forwarding for endpoints without a dedicated mapping.
#[async_trait]
pub trait PassthroughClient: Send + Sync {
    /// Forward `request` verbatim and normalise the reply into an envelope.
    ///
    /// Non-2xx replies are errors carrying the status code and text.
    async fn forward(&self, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope>;
}

/// The strategy a `Gateway` dispatches to.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Short name used in logs, e.g. "demo" or "production".
    fn name(&self) -> &'static str;

    /// Produce the envelope for an already-resolved route.
    ///
    /// `cancel` fires when the caller abandons the request; long-running
    /// handlers should stop work promptly when it does.
    async fn handle(
        &self,
        route: Route,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ReasonCareResult<ResponseEnvelope>;
}
