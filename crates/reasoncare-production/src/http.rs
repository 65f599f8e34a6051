//! Shared HTTP transport for every production client.

use std::time::{Duration, Instant};

use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::{debug, warn};

/// Header naming the deployment region on orchestrator calls.
pub const REGION_HEADER: &str = "x-reasoncare-region";

use reasoncare_config::AuthToken;
use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};

/// A request body ready to send.
#[derive(Debug, Clone)]
pub enum OutboundBody {
    Json(Value),
    Raw { bytes: Vec<u8>, content_type: &'static str },
}

/// A completed exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The transport error for a non-2xx reply: `API Error: <status> <text>`.
    pub fn status_error(&self) -> ReasonCareError {
        ReasonCareError::Transport {
            reason: format!("API Error: {} {}", self.status, self.reason),
        }
    }

    /// Parse the body as JSON. An empty body is `Value::Null`.
    pub fn json(&self) -> ReasonCareResult<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| ReasonCareError::Transport {
            reason: format!("response body is not valid JSON: {e}"),
        })
    }
}

/// A `reqwest` client with the configured timeout and the shared bearer
/// token. The token is read on every request, so rotation applies to the
/// next call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    auth: AuthToken,
    region: Option<String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, auth: AuthToken) -> ReasonCareResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReasonCareError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            auth,
            region: None,
        })
    }

    /// Tag every request with [`REGION_HEADER`].
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn auth(&self) -> &AuthToken {
        &self.auth
    }

    /// Send one request and return the reply, successful or not.
    ///
    /// Only failures to complete the exchange are errors here.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<OutboundBody>,
    ) -> ReasonCareResult<HttpReply> {
        let started = Instant::now();
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");
        if let Some(bearer) = self.auth.bearer() {
            request = request.header(header::AUTHORIZATION, bearer);
        }
        if let Some(region) = &self.region {
            request = request.header(REGION_HEADER, region.as_str());
        }
        request = match body {
            Some(OutboundBody::Json(value)) => request.json(&value),
            Some(OutboundBody::Raw { bytes, content_type }) => {
                request.header(header::CONTENT_TYPE, content_type).body(bytes)
            }
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(%method, url, error = %e, "outbound request failed");
            ReasonCareError::Transport {
                reason: format!("{method} {url} failed: {e}"),
            }
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ReasonCareError::Transport {
                reason: format!("failed to read response from {url}: {e}"),
            })?
            .to_vec();

        debug!(
            %method,
            url,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "outbound request completed"
        );

        Ok(HttpReply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        })
    }

    /// Send and require a 2xx reply, returning its JSON body.
    pub async fn send_json(
        &self,
        method: Method,
        url: &str,
        body: Option<OutboundBody>,
    ) -> ReasonCareResult<Value> {
        let reply = self.send(method, url, body).await?;
        if !reply.is_success() {
            return Err(reply.status_error());
        }
        reply.json()
    }
}

/// Join a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
