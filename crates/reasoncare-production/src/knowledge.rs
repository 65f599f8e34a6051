//! Guideline search against the knowledge-base query endpoint.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use reasoncare_contracts::{capability::KnowledgeResults, error::ReasonCareResult};
use reasoncare_core::traits::KnowledgeRetrieval;

use crate::http::{join_url, HttpTransport, OutboundBody};

const CAPABILITY: &str = "knowledge_retrieval";

pub const MAX_RESULTS: u32 = 10;

pub struct HttpKnowledgeRetrieval {
    transport: HttpTransport,
    orchestrator_url: String,
    knowledge_base_id: String,
}

impl HttpKnowledgeRetrieval {
    pub fn new(
        transport: HttpTransport,
        orchestrator_url: impl Into<String>,
        knowledge_base_id: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            orchestrator_url: orchestrator_url.into(),
            knowledge_base_id: knowledge_base_id.into(),
        }
    }
}

#[async_trait]
impl KnowledgeRetrieval for HttpKnowledgeRetrieval {
    async fn query(&self, text: &str) -> ReasonCareResult<KnowledgeResults> {
        let url = join_url(&self.orchestrator_url, "knowledge-base/query");
        let body = json!({
            "query": text,
            "knowledge_base_id": self.knowledge_base_id,
            "max_results": MAX_RESULTS
        });

        let reply = self
            .transport
            .send_json(Method::POST, &url, Some(OutboundBody::Json(body)))
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;

        let results = texts(&reply["results"], &["content", "text"]);
        let sources = texts(&reply["sources"], &["location", "uri", "name"]);
        debug!(results = results.len(), sources = sources.len(), "knowledge query completed");
        Ok(KnowledgeResults { results, sources })
    }
}

/// Flatten an array of strings, or of objects carrying one of `keys`.
fn texts(value: &Value, keys: &[&str]) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => keys
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
        .collect()
}
