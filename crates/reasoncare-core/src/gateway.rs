//! The gateway: the single entry point callers use.
//!
//! Every call runs the same pipeline:
//!
//!   RequestDescriptor → Route::resolve → RequestHandler::handle → envelope
//!
//! The gateway never returns an error to its caller. Handler errors, caller
//! cancellation and even handler panics are all rendered into a
//! `ResponseEnvelope` with `success = false`.

use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use reasoncare_contracts::{
    envelope::ResponseEnvelope,
    error::{ReasonCareError, ReasonCareResult},
    request::RequestDescriptor,
};

use crate::{routing::Route, traits::RequestHandler};

/// Dispatches requests to the strategy chosen at startup.
///
/// The strategy is fixed for the lifetime of the gateway; there is no
/// runtime mode flag to consult.
#[derive(Clone)]
pub struct Gateway {
    handler: Arc<dyn RequestHandler>,
}

impl Gateway {
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self { handler }
    }

    /// Name of the strategy this gateway dispatches to.
    pub fn handler_name(&self) -> &'static str {
        self.handler.name()
    }

    /// Serve one request. Always returns an envelope.
    pub async fn call(&self, request: RequestDescriptor) -> ResponseEnvelope {
        self.call_with_cancel(request, CancellationToken::new()).await
    }

    /// Serve one request, abandoning it when `cancel` fires.
    ///
    /// Cancellation drops the in-flight handler future; handlers that fan
    /// out (the diagnosis orchestrator) propagate that into their tasks.
    pub async fn call_with_cancel(
        &self,
        request: RequestDescriptor,
        cancel: CancellationToken,
    ) -> ResponseEnvelope {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let route = Route::resolve(request.method, request.route_path());

        debug!(
            request_id = %request_id,
            handler = self.handler.name(),
            method = %request.method,
            path = %request.path,
            route = route.name(),
            "gateway dispatch"
        );

        let outcome = self.dispatch(route, &request, &cancel).await;

        let envelope = match outcome {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(
                    request_id = %request_id,
                    method = %request.method,
                    path = %request.path,
                    error = %err,
                    "gateway call failed"
                );
                render_error(err)
            }
        };

        info!(
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
            success = envelope.success,
            duration_ms = started.elapsed().as_millis() as u64,
            "gateway call completed"
        );

        envelope
    }

    async fn dispatch(
        &self,
        route: Route,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ReasonCareResult<ResponseEnvelope> {
        let handled = AssertUnwindSafe(self.handler.handle(route, request, cancel)).catch_unwind();

        tokio::select! {
            outcome = handled => match outcome {
                Ok(result) => result,
                Err(_) => Err(ReasonCareError::Capability {
                    capability: "gateway".to_string(),
                    reason: format!("{} handler panicked", self.handler.name()),
                }),
            },
            _ = cancel.cancelled() => Err(ReasonCareError::Cancelled),
        }
    }
}

/// Render an error into the failure envelope callers see.
///
/// `error` carries the full error text; `message` a short category summary.
/// Routing misses echo the request path and method instead of a message.
pub fn render_error(err: ReasonCareError) -> ResponseEnvelope {
    let message = match &err {
        ReasonCareError::UnmappedEndpoint { path, method } => {
            return ResponseEnvelope::failure(None, err.to_string()).with_request(path.clone(), *method);
        }
        ReasonCareError::Transport { .. } => "Backend request failed",
        ReasonCareError::Capability { .. } => "Backend capability failed",
        ReasonCareError::Validation { .. } => "Invalid request",
        ReasonCareError::AggregationFailure { .. } => "Diagnosis generation failed",
        ReasonCareError::Cancelled => "Request cancelled",
        ReasonCareError::ConfigError { .. } => "Gateway misconfigured",
    };
    ResponseEnvelope::failure(Some(message.to_string()), err.to_string())
}
