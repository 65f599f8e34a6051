//! Error taxonomy for the ReasonCare gateway.
//!
//! Every fallible operation returns `ReasonCareResult<T>`. The gateway is the
//! only place these errors are turned into wire envelopes; nothing below it
//! renders them for callers.

use thiserror::Error;

use crate::request::Method;

/// The unified error type for the ReasonCare crates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReasonCareError {
    /// A network or HTTP failure reaching a backend or passthrough target.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// Demo-mode routing miss. Rendered as a normal envelope, never fatal.
    #[error("Endpoint not implemented in demo mode")]
    UnmappedEndpoint { path: String, method: Method },

    /// A named backend rejected or failed a call.
    #[error("capability '{capability}' failed: {reason}")]
    Capability { capability: String, reason: String },

    /// The request body could not be used, e.g. unparsable JSON where
    /// structured input is required.
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    /// The orchestrator finished its fan-out with no usable agent result.
    #[error("diagnosis aggregation failed: {reason}")]
    AggregationFailure { reason: String },

    /// The caller abandoned the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl ReasonCareError {
    /// Re-label a transport failure as a failure of the named capability.
    ///
    /// Capability clients share one HTTP transport; errors leaving a client
    /// must name the backend that failed. Non-transport errors pass through.
    pub fn into_capability(self, capability: &str) -> Self {
        match self {
            ReasonCareError::Transport { reason } => ReasonCareError::Capability {
                capability: capability.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// Shorthand for building a `Validation` error.
    pub fn validation(reason: impl Into<String>) -> Self {
        ReasonCareError::Validation { reason: reason.into() }
    }
}

/// Convenience alias used throughout the ReasonCare crates.
pub type ReasonCareResult<T> = Result<T, ReasonCareError>;
