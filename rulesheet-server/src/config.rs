//! Server configuration, read from environment variables

use std::path::PathBuf;
use std::time::Duration;

use rulesheet_client::ClientConfig;
use rulesheet_client::config::DEFAULT_GRAPH_BASE_URL;
use rulesheet_sync::WriteMode;
use shared::SiteDirectory;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// rulesheet-server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub port: u16,
    /// Graph API base URL
    pub graph_base_url: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Token endpoint override, derived from the tenant when unset
    pub token_endpoint: Option<String>,
    /// JSON file with the brand and store tables
    pub site_directory_path: PathBuf,
    /// Timeout of one outbound Graph call
    pub request_timeout: Duration,
    /// Time one event may spend across all of its sites
    pub sync_budget: Duration,
    /// Table rows or whole-file rewrite
    pub write_mode: WriteMode,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, BoxError> {
        let required = |name: &str| -> Result<String, BoxError> {
            var(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| format!("{name} must be set").into())
        };

        let sync_budget = Duration::from_secs(
            var("SYNC_BUDGET_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
        );
        if sync_budget.is_zero() {
            return Err("SYNC_BUDGET_SECS must be positive".into());
        }
        let write_mode = match var("WRITE_MODE").filter(|v| !v.is_empty()) {
            Some(mode) => mode
                .parse::<WriteMode>()
                .map_err(|e| format!("WRITE_MODE: {e}"))?,
            None => WriteMode::default(),
        };

        Ok(Self {
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3002),
            graph_base_url: var("GRAPH_BASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string()),
            tenant_id: required("AZURE_TENANT_ID")?,
            client_id: required("AZURE_CLIENT_ID")?,
            client_secret: required("AZURE_CLIENT_SECRET")?,
            token_endpoint: var("TOKEN_ENDPOINT").filter(|v| !v.is_empty()),
            site_directory_path: PathBuf::from(required("SITE_DIRECTORY_PATH")?),
            request_timeout: Duration::from_secs(
                var("REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            sync_budget,
            write_mode,
        })
    }

    /// Timeout of the inbound handlers
    ///
    /// The engine returns its report within `sync_budget`; one outbound
    /// call timeout on top covers the response itself.
    pub fn handler_timeout(&self) -> Duration {
        self.sync_budget + self.request_timeout
    }

    /// Graph client settings
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.graph_base_url)
            .with_credentials(&self.tenant_id, &self.client_id, &self.client_secret)
            .with_timeout(self.request_timeout.as_secs());
        match &self.token_endpoint {
            Some(url) => config.with_token_endpoint(url),
            None => config,
        }
    }

    /// Read and parse the site directory file
    pub fn load_site_directory(&self) -> Result<SiteDirectory, BoxError> {
        let raw = std::fs::read_to_string(&self.site_directory_path).map_err(|e| {
            format!(
                "Failed to read site directory {}: {e}",
                self.site_directory_path.display()
            )
        })?;
        SiteDirectory::from_json(&raw).map_err(|e| {
            format!(
                "Invalid site directory {}: {e}",
                self.site_directory_path.display()
            )
            .into()
        })
    }
}
