//! Best-effort remote metrics.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};

use reasoncare_contracts::capability::MetricUnit;
use reasoncare_core::traits::MetricsSink;

use crate::http::{join_url, HttpTransport, OutboundBody};

pub const NAMESPACE: &str = "ReasonCare";

/// Posts CloudWatch-shaped metric data to `<orchestrator>/metrics`.
///
/// Failures are logged and dropped; `emit` never reports them.
pub struct HttpMetricsSink {
    transport: HttpTransport,
    orchestrator_url: String,
}

impl HttpMetricsSink {
    pub fn new(transport: HttpTransport, orchestrator_url: impl Into<String>) -> Self {
        Self {
            transport,
            orchestrator_url: orchestrator_url.into(),
        }
    }
}

#[async_trait]
impl MetricsSink for HttpMetricsSink {
    async fn emit(&self, name: &str, value: f64, unit: MetricUnit) {
        let url = join_url(&self.orchestrator_url, "metrics");
        let body = json!({
            "Namespace": NAMESPACE,
            "MetricData": [{
                "MetricName": name,
                "Value": value,
                "Unit": unit.as_str(),
                "Timestamp": Utc::now().to_rfc3339()
            }]
        });

        match self
            .transport
            .send(Method::POST, &url, Some(OutboundBody::Json(body)))
            .await
        {
            Ok(reply) if reply.is_success() => debug!(metric = %name, value, "metric emitted"),
            Ok(reply) => warn!(metric = %name, status = reply.status, "metrics backend rejected metric"),
            Err(e) => warn!(metric = %name, error = %e, "metrics backend unreachable"),
        }
    }
}
