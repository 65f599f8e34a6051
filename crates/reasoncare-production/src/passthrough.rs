//! Forwarding for endpoints without a dedicated capability mapping.

use async_trait::async_trait;
use reqwest::Method as HttpMethod;
use serde_json::Value;
use tracing::info;

use reasoncare_contracts::{
    envelope::ResponseEnvelope,
    error::ReasonCareResult,
    request::{Method, RequestDescriptor},
};
use reasoncare_core::traits::PassthroughClient;

use crate::http::{join_url, HttpTransport, OutboundBody};

/// Forwards requests verbatim to `base_url + path`.
pub struct HttpPassthrough {
    transport: HttpTransport,
    base_url: String,
}

impl HttpPassthrough {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PassthroughClient for HttpPassthrough {
    async fn forward(&self, request: &RequestDescriptor) -> ReasonCareResult<ResponseEnvelope> {
        let url = join_url(&self.base_url, &request.path);
        let body = request.body.to_bytes()?.map(|bytes| OutboundBody::Raw {
            bytes,
            content_type: "application/json",
        });

        info!(method = %request.method, path = %request.path, "forwarding unmapped endpoint");
        let reply = self.transport.send(http_method(request.method), &url, body).await?;
        if !reply.is_success() {
            return Err(reply.status_error());
        }
        Ok(normalise(reply.json()?))
    }
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::GET,
        Method::Post => HttpMethod::POST,
        Method::Put => HttpMethod::PUT,
        Method::Delete => HttpMethod::DELETE,
    }
}

/// Shape a 2xx body into an envelope.
///
/// A body that already is an envelope (an object with a boolean `success`)
/// is returned as-is; other JSON becomes `data`; no body is a bare success.
pub fn normalise(body: Value) -> ResponseEnvelope {
    if body.is_null() {
        return ResponseEnvelope::bare_success();
    }
    if body.get("success").is_some_and(Value::is_boolean) {
        if let Ok(envelope) = serde_json::from_value::<ResponseEnvelope>(body.clone()) {
            return envelope;
        }
    }
    ResponseEnvelope {
        data: Some(body),
        ..ResponseEnvelope::bare_success()
    }
}
