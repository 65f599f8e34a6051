//! Metric emission helpers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use reasoncare_contracts::capability::MetricUnit;

use crate::traits::MetricsSink;

/// A sink that renders metrics as structured log events.
///
/// Stands in for a remote backend when `metrics_backend = "log"`.
#[derive(Debug, Default, Clone)]
pub struct LogMetricsSink;

#[async_trait]
impl MetricsSink for LogMetricsSink {
    async fn emit(&self, name: &str, value: f64, unit: MetricUnit) {
        info!(metric = %name, value, unit = unit.as_str(), "metric");
    }
}

/// Emit on a detached task so the caller never waits on the sink.
pub fn emit_detached(sink: &Arc<dyn MetricsSink>, name: impl Into<String>, value: f64, unit: MetricUnit) {
    let sink = Arc::clone(sink);
    let name = name.into();
    tokio::spawn(async move {
        sink.emit(&name, value, unit).await;
    });
}
