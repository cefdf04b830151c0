use std::sync::Arc;

use config::Config;
use gateway::GatewayClient;
use ingest::{BoundedDedupCache, Ingestor, LoggingHooks};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Absent when gateway API keys are not configured; charge routes
    /// answer with a configuration error in that case.
    pub gateway: Option<Arc<GatewayClient>>,
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = GatewayClient::from_config(&config.gateway)
            .ok()
            .map(Arc::new);
        let ingestor = Arc::new(Ingestor::new(
            config.webhook_secret.clone(),
            Arc::new(BoundedDedupCache::default()),
            Arc::new(LoggingHooks),
        ));
        Self {
            config: Arc::new(config),
            gateway,
            ingestor,
        }
    }

    /// Assembles a state from pre-built parts. Used by tests to inject
    /// recording hooks and inspectable dedup stores.
    pub fn from_parts(
        config: Arc<Config>,
        gateway: Option<Arc<GatewayClient>>,
        ingestor: Arc<Ingestor>,
    ) -> Self {
        Self {
            config,
            gateway,
            ingestor,
        }
    }
}
