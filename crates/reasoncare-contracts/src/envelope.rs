//! The uniform response envelope.
//!
//! Field names (`success`, `data`, `message`, `error`) are the wire contract
//! the UI depends on. Absent optional fields are omitted, not serialized as
//! `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::Method;

/// What every gateway call returns, whether it succeeded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Echo of the request path; only set on routing misses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Echo of the request method; only set on routing misses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
}

impl ResponseEnvelope {
    /// A successful envelope carrying `data` and a fixed `message`.
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            ..Self::bare_success()
        }
    }

    /// `{ "success": true }` and nothing else.
    pub fn bare_success() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
            path: None,
            method: None,
        }
    }

    /// A failed envelope. `message` is an optional human summary.
    pub fn failure(message: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message,
            error: Some(error.into()),
            ..Self::bare_success()
        }
    }

    /// Attach the request path and method, as routing misses do.
    pub fn with_request(mut self, path: impl Into<String>, method: Method) -> Self {
        self.path = Some(path.into());
        self.method = Some(method);
        self
    }
}
