//! # reasoncare-core
//!
//! The gateway's moving parts, independent of any concrete backend:
//!
//! - `traits`: capability traits and the `RequestHandler` strategy seam
//! - `routing`: path/method → `Route` resolution
//! - `gateway`: the dispatcher every caller goes through
//! - `orchestrator`: concurrent multi-agent diagnosis with aggregation
//! - `metrics`: log-backed sink and detached emission
//! - `audio`: audio extraction from request payloads
//!
//! Demo and production handlers live in their own crates and plug in
//! through `RequestHandler`.

pub mod audio;
pub mod gateway;
pub mod metrics;
pub mod orchestrator;
pub mod routing;
pub mod traits;

pub use gateway::Gateway;
pub use orchestrator::AgentOrchestrator;
pub use routing::Route;
