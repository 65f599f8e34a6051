//! Generative model invocation in the Messages API request shape.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use reasoncare_contracts::{
    capability::{ModelOutput, TokenUsage},
    error::{ReasonCareError, ReasonCareResult},
};
use reasoncare_core::traits::GenerativeModelInvocation;

use crate::http::{join_url, HttpTransport, OutboundBody};

const CAPABILITY: &str = "generative_model";

pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
pub const MAX_TOKENS: u32 = 4000;

/// Posts prompts to `<orchestrator>/model/<modelRef>/invoke`.
pub struct HttpModelInvocation {
    transport: HttpTransport,
    orchestrator_url: String,
}

impl HttpModelInvocation {
    pub fn new(transport: HttpTransport, orchestrator_url: impl Into<String>) -> Self {
        Self {
            transport,
            orchestrator_url: orchestrator_url.into(),
        }
    }
}

#[async_trait]
impl GenerativeModelInvocation for HttpModelInvocation {
    async fn invoke(&self, model_ref: &str, prompt: &str) -> ReasonCareResult<ModelOutput> {
        let url = join_url(&self.orchestrator_url, &format!("model/{model_ref}/invoke"));
        let body = json!({
            "anthropic_version": ANTHROPIC_VERSION,
            "max_tokens": MAX_TOKENS,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let reply = self
            .transport
            .send_json(Method::POST, &url, Some(OutboundBody::Json(body)))
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;

        let parsed: MessagesReply = serde_json::from_value(reply).map_err(|e| ReasonCareError::Capability {
            capability: CAPABILITY.to_string(),
            reason: format!("unexpected model response shape: {e}"),
        })?;

        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| ReasonCareError::Capability {
                capability: CAPABILITY.to_string(),
                reason: "model response carried no text content".to_string(),
            })?;

        debug!(
            model_ref,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "model invocation completed"
        );
        Ok(ModelOutput {
            text,
            usage: parsed.usage,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
