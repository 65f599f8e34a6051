//! Layered configuration: defaults, then an optional TOML file, then
//! `REASONCARE_*` environment variables, then validation.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use tracing::debug;

use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};

use crate::token::AuthToken;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "reasoncare.toml";

const ENV_PREFIX: &str = "REASONCARE_";

/// Which strategy the gateway serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Demo,
    Production,
}

impl FromStr for Mode {
    type Err = ReasonCareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Self::Demo),
            "production" => Ok(Self::Production),
            other => Err(config_error(format!(
                "unsupported mode `{other}` (expected demo|production)"
            ))),
        }
    }
}

/// Where patient records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map; lost on exit.
    Memory,
    /// One JSON file per patient under `store.dir`.
    File,
    /// The remote EHR API at `base_url`.
    Http,
}

impl FromStr for StoreBackend {
    type Err = ReasonCareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "http" => Ok(Self::Http),
            other => Err(config_error(format!(
                "unsupported store backend `{other}` (expected memory|file|http)"
            ))),
        }
    }
}

/// Where production metrics go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    /// POST to `<orchestrator_url>/metrics`.
    Http,
    /// Structured log lines only.
    Log,
}

impl FromStr for MetricsBackend {
    type Err = ReasonCareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "log" => Ok(Self::Log),
            other => Err(config_error(format!(
                "unsupported metrics backend `{other}` (expected http|log)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ReasonCareError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(config_error(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoSettings {
    /// Directory holding fixture overrides; built-in fixtures when `None`.
    pub fixtures_dir: Option<PathBuf>,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Process-wide gateway configuration. Read-only after load, except for
/// the auth token, which rotates through its own handle.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub mode: Mode,
    pub base_url: String,
    pub auth_token: AuthToken,
    /// Sent as `x-reasoncare-region` on every orchestrator call.
    pub region: Option<String>,
    pub orchestrator_url: Option<String>,
    pub knowledge_base_id: Option<String>,
    pub bucket_ref: Option<String>,
    pub request_timeout_ms: u64,
    pub metrics_backend: MetricsBackend,
    pub demo: DemoSettings,
    pub store: StoreSettings,
    pub logging: LoggingConfig,
}

/// How `Configuration::load` finds its inputs.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit TOML path; `reasoncare.toml` in the working directory if unset.
    pub config_path: Option<PathBuf>,
    /// Fail when the file is absent instead of running on defaults.
    pub require_file: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            mode: Mode::Demo,
            base_url: "https://api.reasoncare.io".to_string(),
            auth_token: AuthToken::default(),
            region: Some("us-east-1".to_string()),
            orchestrator_url: None,
            knowledge_base_id: None,
            bucket_ref: None,
            request_timeout_ms: 10_000,
            metrics_backend: MetricsBackend::Http,
            demo: DemoSettings {
                fixtures_dir: None,
                latency_min_ms: 500,
                latency_max_ms: 1500,
            },
            store: StoreSettings {
                backend: StoreBackend::Memory,
                dir: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Compact,
            },
        }
    }
}

impl Configuration {
    /// Load from the process environment and the configured file.
    pub fn load(options: LoadOptions) -> ReasonCareResult<Self> {
        Self::load_with_env(options, |key| std::env::var(key).ok())
    }

    /// Like `load`, with environment lookups going through `lookup`.
    pub fn load_with_env(
        options: LoadOptions,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ReasonCareResult<Self> {
        let mut config = Self::default();

        let path = options
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            debug!(path = %path.display(), "loading configuration file");
            config.apply_patch(read_patch(&path)?);
        } else if options.require_file {
            return Err(config_error(format!(
                "required config file was not found: '{}'",
                path.display()
            )));
        }

        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document over the defaults and validate. No environment.
    pub fn from_toml_str(s: &str) -> ReasonCareResult<Self> {
        let patch: ConfigPatch = toml::from_str(s)
            .map_err(|e| config_error(format!("failed to parse configuration TOML: {e}")))?;
        let mut config = Self::default();
        config.apply_patch(patch);
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the file at `path`. No environment.
    pub fn from_file(path: &Path) -> ReasonCareResult<Self> {
        let mut config = Self::default();
        config.apply_patch(read_patch(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field requirements.
    pub fn validate(&self) -> ReasonCareResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(config_error("base_url must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(config_error("request_timeout_ms must be greater than zero"));
        }
        if self.demo.latency_min_ms >= self.demo.latency_max_ms {
            return Err(config_error(format!(
                "demo latency range is empty: latency_min_ms ({}) must be below latency_max_ms ({})",
                self.demo.latency_min_ms, self.demo.latency_max_ms
            )));
        }
        if self.store.backend == StoreBackend::File && self.store.dir.is_none() {
            return Err(config_error("store.backend = \"file\" requires store.dir"));
        }

        if self.mode == Mode::Production {
            let required = [
                ("region", &self.region),
                ("orchestrator_url", &self.orchestrator_url),
                ("knowledge_base_id", &self.knowledge_base_id),
                ("bucket_ref", &self.bucket_ref),
            ];
            let missing: Vec<&str> = required
                .iter()
                .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
                .map(|(key, _)| *key)
                .collect();
            if !missing.is_empty() {
                return Err(config_error(format!(
                    "production mode requires: {}",
                    missing.join(", ")
                )));
            }
        }

        Ok(())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(base_url) = patch.base_url {
            self.base_url = base_url;
        }
        if let Some(token) = patch.auth_token {
            self.auth_token = AuthToken::new(token);
        }
        if let Some(region) = patch.region {
            self.region = Some(region);
        }
        if let Some(url) = patch.orchestrator_url {
            self.orchestrator_url = Some(url);
        }
        if let Some(id) = patch.knowledge_base_id {
            self.knowledge_base_id = Some(id);
        }
        if let Some(bucket) = patch.bucket_ref {
            self.bucket_ref = Some(bucket);
        }
        if let Some(timeout) = patch.request_timeout_ms {
            self.request_timeout_ms = timeout;
        }
        if let Some(backend) = patch.metrics_backend {
            self.metrics_backend = backend;
        }

        if let Some(demo) = patch.demo {
            if let Some(dir) = demo.fixtures_dir {
                self.demo.fixtures_dir = Some(dir);
            }
            if let Some(min) = demo.latency_min_ms {
                self.demo.latency_min_ms = min;
            }
            if let Some(max) = demo.latency_max_ms {
                self.demo.latency_max_ms = max;
            }
        }

        if let Some(store) = patch.store {
            if let Some(backend) = store.backend {
                self.store.backend = backend;
            }
            if let Some(dir) = store.dir {
                self.store.dir = Some(dir);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ReasonCareResult<()> {
        let read = |key: &str| {
            lookup(&format!("{ENV_PREFIX}{key}")).filter(|value| !value.trim().is_empty())
        };

        if let Some(value) = read("MODE") {
            self.mode = value.parse()?;
        }
        if let Some(value) = read("BASE_URL") {
            self.base_url = value;
        }
        if let Some(value) = read("AUTH_TOKEN") {
            self.auth_token = AuthToken::new(value);
        }
        if let Some(value) = read("REGION") {
            self.region = Some(value);
        }
        if let Some(value) = read("ORCHESTRATOR_URL") {
            self.orchestrator_url = Some(value);
        }
        if let Some(value) = read("KNOWLEDGE_BASE_ID") {
            self.knowledge_base_id = Some(value);
        }
        if let Some(value) = read("BUCKET_REF") {
            self.bucket_ref = Some(value);
        }
        if let Some(value) = read("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = parse_u64("REQUEST_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = read("METRICS_BACKEND") {
            self.metrics_backend = value.parse()?;
        }
        if let Some(value) = read("DEMO_FIXTURES_DIR") {
            self.demo.fixtures_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read("DEMO_LATENCY_MIN_MS") {
            self.demo.latency_min_ms = parse_u64("DEMO_LATENCY_MIN_MS", &value)?;
        }
        if let Some(value) = read("DEMO_LATENCY_MAX_MS") {
            self.demo.latency_max_ms = parse_u64("DEMO_LATENCY_MAX_MS", &value)?;
        }
        if let Some(value) = read("STORE_BACKEND") {
            self.store.backend = value.parse()?;
        }
        if let Some(value) = read("STORE_DIR") {
            self.store.dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = read("LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }
}

fn read_patch(path: &Path) -> ReasonCareResult<ConfigPatch> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        config_error(format!("failed to read config file '{}': {e}", path.display()))
    })?;
    toml::from_str(&contents).map_err(|e| {
        config_error(format!("failed to parse config file '{}': {e}", path.display()))
    })
}

fn parse_u64(key: &str, value: &str) -> ReasonCareResult<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        config_error(format!("invalid environment override for `{ENV_PREFIX}{key}`: `{value}`"))
    })
}

fn config_error(reason: impl Into<String>) -> ReasonCareError {
    ReasonCareError::ConfigError { reason: reason.into() }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    mode: Option<Mode>,
    base_url: Option<String>,
    auth_token: Option<String>,
    region: Option<String>,
    orchestrator_url: Option<String>,
    knowledge_base_id: Option<String>,
    bucket_ref: Option<String>,
    request_timeout_ms: Option<u64>,
    metrics_backend: Option<MetricsBackend>,
    demo: Option<DemoPatch>,
    store: Option<StorePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DemoPatch {
    fixtures_dir: Option<PathBuf>,
    latency_min_ms: Option<u64>,
    latency_max_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorePatch {
    backend: Option<StoreBackend>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
