//! # reasoncare-verify
//!
//! Structural validation of ReasonCare request bodies.
//!
//! Each structured endpoint has a `RequestSchema` (a JSON Schema document).
//! [`engine::RequestValidator`] compiles them once and rejects bodies that
//! do not match with a `ReasonCareError::Validation` naming every
//! violation.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use reasoncare_verify::{RequestSchema, RequestValidator};
//!
//! let validator = RequestValidator::new()?;
//! validator.validate(RequestSchema::DiagnosisUpdate, &body)?;
//! ```

pub mod engine;
pub mod schemas;

pub use engine::RequestValidator;
pub use schemas::RequestSchema;
