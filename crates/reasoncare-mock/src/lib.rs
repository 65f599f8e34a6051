//! # reasoncare-mock
//!
//! Demo mode for the ReasonCare gateway.
//!
//! [`DemoResponder`] implements `RequestHandler` with a fixed endpoint
//! table and a simulated 500–1500 ms latency, so the UI can be exercised
//! without any backend. Response shapes are deterministic; only timing
//! varies.
//!
//! All data is hardcoded and fictional. No external calls are made.

pub mod fixtures;
pub mod responder;

pub use fixtures::Fixtures;
pub use responder::DemoResponder;
