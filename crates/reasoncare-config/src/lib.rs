//! # reasoncare-config
//!
//! Configuration for the ReasonCare gateway.
//!
//! `Configuration::load` layers its inputs in this order, later layers
//! winning:
//!
//! 1. built-in defaults (demo mode, in-memory store, 500–1500 ms demo latency)
//! 2. a TOML file (`reasoncare.toml`, or an explicit path)
//! 3. `REASONCARE_*` environment variables
//!
//! and then validates the result. Production mode refuses to load without
//! its backend coordinates.
//!
//! ```toml
//! mode = "production"
//! base_url = "https://api.reasoncare.io"
//! orchestrator_url = "https://orchestrator.internal"
//! knowledge_base_id = "KB123"
//! bucket_ref = "reasoncare-media"
//! metrics_backend = "log"
//!
//! [store]
//! backend = "http"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

pub mod config;
pub mod mode;
pub mod token;

pub use config::{
    Configuration, DemoSettings, LoadOptions, LogFormat, LoggingConfig, MetricsBackend, Mode,
    StoreBackend, StoreSettings,
};
pub use mode::ModeResolver;
pub use token::AuthToken;
