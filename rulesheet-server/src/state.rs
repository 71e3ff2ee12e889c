use std::sync::Arc;

use rulesheet_client::{GraphClient, TokenProvider};
use rulesheet_sync::{SyncEngine, TracingLog};
use tokio_util::sync::CancellationToken;

use crate::config::{BoxError, Config};

pub struct AppState {
    pub engine: SyncEngine,
}

impl AppState {
    /// Wire the Graph client, site directory and engine from configuration
    pub fn from_config(
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<Arc<Self>, BoxError> {
        let client_config = config.client_config();
        let tokens: Arc<dyn TokenProvider> = Arc::new(client_config.build_token_provider()?);
        let client: GraphClient = client_config.build_graph_client(tokens)?;
        let directory = config.load_site_directory()?;

        tracing::info!(
            brands = directory.brands.len(),
            stores = directory.stores.len(),
            "Site directory loaded"
        );

        let engine = SyncEngine::new(Arc::new(client), Arc::new(directory))
            .with_log(Arc::new(TracingLog))
            .with_write_mode(config.write_mode)
            .with_event_budget(config.sync_budget)
            .with_shutdown(shutdown);

        Ok(Arc::new(Self { engine }))
    }
}
