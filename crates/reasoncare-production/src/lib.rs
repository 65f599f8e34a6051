//! # reasoncare-production
//!
//! Production mode for the ReasonCare gateway: HTTP capability clients and
//! the [`ProductionAdapter`] that maps routes onto them.
//!
//! All clients share one [`HttpTransport`], so they share the request
//! timeout and the rotatable bearer token. Orchestrator calls also carry the
//! configured region. Endpoints without a mapping are forwarded by
//! [`HttpPassthrough`] to `base_url + path`.

pub mod adapter;
pub mod documents;
pub mod http;
pub mod knowledge;
pub mod metrics;
pub mod model;
pub mod passthrough;
pub mod transcription;

use std::{sync::Arc, time::Duration};

use reasoncare_config::{Configuration, MetricsBackend};
use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};
use reasoncare_core::{
    metrics::LogMetricsSink,
    orchestrator::AgentRegistry,
    traits::{
        DocumentStore, GenerativeModelInvocation, KnowledgeRetrieval, MetricsSink, PassthroughClient,
        SpeechTranscription,
    },
    AgentOrchestrator,
};

pub use adapter::ProductionAdapter;
pub use documents::HttpDocumentStore;
pub use http::HttpTransport;
pub use knowledge::HttpKnowledgeRetrieval;
pub use metrics::HttpMetricsSink;
pub use model::HttpModelInvocation;
pub use passthrough::HttpPassthrough;
pub use transcription::HttpSpeechTranscription;

/// Every remote capability, built from one configuration.
#[derive(Clone)]
pub struct ProductionClients {
    pub transport: HttpTransport,
    pub transcription: Arc<dyn SpeechTranscription>,
    pub models: Arc<dyn GenerativeModelInvocation>,
    pub knowledge: Arc<dyn KnowledgeRetrieval>,
    pub metrics: Arc<dyn MetricsSink>,
    pub passthrough: Arc<dyn PassthroughClient>,
}

impl ProductionClients {
    /// Build HTTP clients for the configured backends.
    ///
    /// Returns `ReasonCareError::ConfigError` when a backend coordinate is
    /// missing.
    pub fn from_config(config: &Configuration) -> ReasonCareResult<Self> {
        let orchestrator_url = required(&config.orchestrator_url, "orchestrator_url")?;
        let knowledge_base_id = required(&config.knowledge_base_id, "knowledge_base_id")?;
        let bucket_ref = required(&config.bucket_ref, "bucket_ref")?;

        let transport = HttpTransport::new(
            Duration::from_millis(config.request_timeout_ms),
            config.auth_token.clone(),
        )?;
        let orchestrator = match config.region.as_deref().filter(|r| !r.trim().is_empty()) {
            Some(region) => transport.clone().with_region(region),
            None => transport.clone(),
        };

        let metrics: Arc<dyn MetricsSink> = match config.metrics_backend {
            MetricsBackend::Http => Arc::new(HttpMetricsSink::new(orchestrator.clone(), orchestrator_url)),
            MetricsBackend::Log => Arc::new(LogMetricsSink),
        };

        Ok(Self {
            transcription: Arc::new(HttpSpeechTranscription::new(
                orchestrator.clone(),
                orchestrator_url,
                bucket_ref,
            )),
            models: Arc::new(HttpModelInvocation::new(orchestrator.clone(), orchestrator_url)),
            knowledge: Arc::new(HttpKnowledgeRetrieval::new(
                orchestrator,
                orchestrator_url,
                knowledge_base_id,
            )),
            metrics,
            passthrough: Arc::new(HttpPassthrough::new(transport.clone(), config.base_url.clone())),
            transport,
        })
    }

    /// The remote EHR store at `base_url`, sharing this transport.
    pub fn document_store(&self, config: &Configuration) -> HttpDocumentStore {
        HttpDocumentStore::new(self.transport.clone(), config.base_url.clone())
    }

    /// Assemble the adapter over these clients and `documents`.
    pub fn into_adapter(self, documents: Arc<dyn DocumentStore>) -> ReasonCareResult<ProductionAdapter> {
        let orchestrator = AgentOrchestrator::new(
            AgentRegistry::builtin(),
            Arc::clone(&self.models),
            Arc::clone(&self.transcription),
            Arc::clone(&self.metrics),
        );
        ProductionAdapter::new(
            orchestrator,
            self.transcription,
            documents,
            self.knowledge,
            self.passthrough,
        )
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> ReasonCareResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ReasonCareError::ConfigError {
            reason: format!("production mode requires {key}"),
        })
}
