//! Startup wiring: logging, document store, handler and gateway.

use std::{sync::Arc, time::Duration};

use tracing::info;
use tracing_subscriber::EnvFilter;

use reasoncare_config::{Configuration, LogFormat, LoggingConfig, Mode, ModeResolver, StoreBackend};
use reasoncare_contracts::error::{ReasonCareError, ReasonCareResult};
use reasoncare_core::{traits::DocumentStore, traits::RequestHandler, Gateway};
use reasoncare_mock::{DemoResponder, Fixtures};
use reasoncare_production::ProductionClients;
use reasoncare_store::{FileDocumentStore, InMemoryDocumentStore};

/// A configured gateway and the configuration it was built from.
pub struct App {
    pub config: Configuration,
    pub gateway: Gateway,
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this twice
/// leaves the first subscriber in place.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Build everything the gateway needs from `config`.
pub async fn bootstrap(config: Configuration) -> ReasonCareResult<App> {
    config.validate()?;
    let handler = build_handler(&config).await?;
    info!(
        handler = handler.name(),
        base_url = %config.base_url,
        store = ?config.store.backend,
        "gateway ready"
    );
    Ok(App {
        gateway: Gateway::new(handler),
        config,
    })
}

/// Pick the request handler for the configured mode.
///
/// This is the only place the mode is consulted.
pub async fn build_handler(config: &Configuration) -> ReasonCareResult<Arc<dyn RequestHandler>> {
    match ModeResolver::new(config).mode() {
        Mode::Demo => {
            let fixtures = match &config.demo.fixtures_dir {
                Some(dir) => Fixtures::load_dir(dir)?,
                None => Fixtures::builtin(),
            };
            let responder = DemoResponder::new(fixtures)?.with_latency(
                Duration::from_millis(config.demo.latency_min_ms),
                Duration::from_millis(config.demo.latency_max_ms),
            );
            Ok(Arc::new(responder))
        }
        Mode::Production => {
            let clients = ProductionClients::from_config(config)?;
            let documents = build_document_store(config, &clients).await?;
            Ok(Arc::new(clients.into_adapter(documents)?))
        }
    }
}

/// The patient record store selected by `store.backend`.
pub async fn build_document_store(
    config: &Configuration,
    clients: &ProductionClients,
) -> ReasonCareResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StoreBackend::File => {
            let dir = config.store.dir.clone().ok_or_else(|| ReasonCareError::ConfigError {
                reason: "store.dir is required for the file backend".to_string(),
            })?;
            Arc::new(FileDocumentStore::open(dir).await?)
        }
        StoreBackend::Http => Arc::new(clients.document_store(config)),
    };
    Ok(store)
}
