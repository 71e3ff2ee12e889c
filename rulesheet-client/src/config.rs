//! Client configuration

use std::sync::Arc;

use crate::auth::{ClientCredentials, TokenProvider};
use crate::error::{ClientError, ClientResult};
use crate::http::GraphClient;

/// Default Graph endpoint (v1.0)
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default scope requested in the client-credentials exchange
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Client configuration for the Graph workbook API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Graph base URL (e.g., "https://graph.microsoft.com/v1.0")
    pub graph_base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory tenant id
    pub tenant_id: Option<String>,

    /// Application (client) id
    pub client_id: Option<String>,

    /// Application secret
    pub client_secret: Option<String>,

    /// Token endpoint, derived from the tenant when unset
    pub token_endpoint: Option<String>,

    /// OAuth scope
    pub scope: String,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(graph_base_url: impl Into<String>) -> Self {
        Self {
            graph_base_url: graph_base_url.into(),
            timeout: 30,
            tenant_id: None,
            client_id: None,
            client_secret: None,
            token_endpoint: None,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Set the client credentials
    pub fn with_credentials(
        mut self,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Override the token endpoint
    pub fn with_token_endpoint(mut self, url: impl Into<String>) -> Self {
        self.token_endpoint = Some(url.into());
        self
    }

    /// Override the requested scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Token endpoint, explicit or derived from the tenant id
    pub fn resolved_token_endpoint(&self) -> Option<String> {
        self.token_endpoint.clone().or_else(|| {
            self.tenant_id.as_ref().map(|tenant| {
                format!("https://login.microsoftonline.com/{tenant}/oauth2/v2.0/token")
            })
        })
    }

    /// Create a client-credentials token provider from this configuration
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if the client id, secret or token
    /// endpoint cannot be determined.
    pub fn build_token_provider(&self) -> ClientResult<ClientCredentials> {
        let client_id = self
            .client_id
            .clone()
            .ok_or_else(|| ClientError::Config("client_id is required".into()))?;
        let client_secret = self
            .client_secret
            .clone()
            .ok_or_else(|| ClientError::Config("client_secret is required".into()))?;
        let token_endpoint = self
            .resolved_token_endpoint()
            .ok_or_else(|| ClientError::Config("tenant_id or token_endpoint is required".into()))?;

        ClientCredentials::new(
            token_endpoint,
            client_id,
            client_secret,
            self.scope.clone(),
            self.timeout,
        )
    }

    /// Create a Graph client from this configuration
    pub fn build_graph_client(&self, tokens: Arc<dyn TokenProvider>) -> ClientResult<GraphClient> {
        GraphClient::new(self, tokens)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_BASE_URL)
    }
}
