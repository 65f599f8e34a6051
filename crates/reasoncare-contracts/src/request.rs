//! Inbound request descriptors.
//!
//! A `RequestDescriptor` is built by the caller for each gateway call and
//! handed over by value. The body stays opaque until a handler asks for it
//! as JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReasonCareError, ReasonCareResult};

/// HTTP method of a logical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ReasonCareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(ReasonCareError::validation(format!(
                "unsupported method `{other}` (expected GET|POST|PUT|DELETE)"
            ))),
        }
    }
}

/// The request body: absent, already-structured JSON, or raw bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Bytes(Vec<u8>),
}

impl RequestBody {
    /// True when there is nothing to send.
    ///
    /// Byte bodies holding only whitespace count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Json(_) => false,
            RequestBody::Bytes(bytes) => bytes.iter().all(u8::is_ascii_whitespace),
        }
    }

    /// Interpret the body as JSON. An empty body is `Value::Null`.
    ///
    /// Returns `ReasonCareError::Validation` when raw bytes do not parse.
    pub fn to_json(&self) -> ReasonCareResult<Value> {
        if self.is_empty() {
            return Ok(Value::Null);
        }
        match self {
            RequestBody::Json(value) => Ok(value.clone()),
            RequestBody::Bytes(bytes) => serde_json::from_slice(bytes).map_err(|e| {
                ReasonCareError::validation(format!("request body is not valid JSON: {e}"))
            }),
            RequestBody::Empty => Ok(Value::Null),
        }
    }

    /// Serialize the body for forwarding, or `None` when empty.
    pub fn to_bytes(&self) -> ReasonCareResult<Option<Vec<u8>>> {
        if self.is_empty() {
            return Ok(None);
        }
        match self {
            RequestBody::Json(value) => serde_json::to_vec(value).map(Some).map_err(|e| {
                ReasonCareError::validation(format!("request body could not be encoded: {e}"))
            }),
            RequestBody::Bytes(bytes) => Ok(Some(bytes.clone())),
            RequestBody::Empty => Ok(None),
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// One logical API call as issued by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Request path including any query string, e.g. `/api/ehr/P1`.
    pub path: String,
    pub method: Method,
    pub body: RequestBody,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// The path with any `?query` suffix removed. Routing matches on this.
    pub fn route_path(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }
}
