//! # reasoncare
//!
//! Bootstrap for the ReasonCare gateway and the scripted walkthrough the
//! `reasoncare-demo` binary runs.
//!
//! ```no_run
//! # async fn run() -> reasoncare_contracts::error::ReasonCareResult<()> {
//! use reasoncare::bootstrap;
//! use reasoncare_config::{Configuration, LoadOptions};
//! use reasoncare_contracts::request::RequestDescriptor;
//!
//! let config = Configuration::load(LoadOptions::default())?;
//! let app = bootstrap::bootstrap(config).await?;
//! let envelope = app.gateway.call(RequestDescriptor::get("/api/ehr/P001")).await;
//! assert!(envelope.success);
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod walkthrough;

pub use bootstrap::{bootstrap, init_logging, App};
