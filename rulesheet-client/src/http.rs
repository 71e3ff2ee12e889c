//! Graph workbook client over HTTP

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::WorkbookApi;
use crate::auth::TokenProvider;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{
    ColumnInfo, DriveItem, ItemRef, ODataList, RangeValues, Site, TableInfo, TableRef, Worksheet,
};

/// Header asking the service to write through co-authoring locks
const PREFER_BYPASS_SHARED_LOCK: &str = "bypass-shared-lock";

/// Graph workbook client
#[derive(Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str) -> ClientResult<reqwest::RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await?;
        tracing::debug!(status = %status, body = %body, "Graph request failed");
        Err(ClientError::from_response(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.request(Method::GET, path).await?;
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// GET returning `None` on 404
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Option<T>> {
        match self.get_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(ClientError::NotFound(message)) => {
                tracing::debug!(path, message = %message, "Resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn send_values(&self, method: Method, path: &str, values: &[Value]) -> ClientResult<()> {
        let body = json!({ "values": [values] });
        let request = self.request(method, path).await?.json(&body);
        self.send(request).await?;
        Ok(())
    }
}

/// Flatten a single-row 2-D range into a row
fn first_row(range: RangeValues) -> Vec<Value> {
    range.values.into_iter().next().unwrap_or_default()
}

/// Flatten a single-column 2-D range into a column
fn first_column(range: RangeValues) -> Vec<Value> {
    range
        .values
        .into_iter()
        .map(|row| row.into_iter().next().unwrap_or(Value::Null))
        .collect()
}

#[async_trait]
impl WorkbookApi for GraphClient {
    async fn site_id(&self, url_key: &str) -> ClientResult<Option<String>> {
        let site: Option<Site> = self.get_optional(&format!("sites/{url_key}")).await?;
        Ok(site.and_then(|s| s.id))
    }

    async fn drive_item_id(&self, site_id: &str, path: &str) -> ClientResult<Option<String>> {
        let path = path.trim_start_matches('/');
        let item: Option<DriveItem> = self
            .get_optional(&format!("sites/{site_id}/drive/root:/{path}"))
            .await?;
        Ok(item.and_then(|i| i.id))
    }

    async fn list_worksheets(&self, item: &ItemRef) -> ClientResult<Vec<Worksheet>> {
        let list: ODataList<Worksheet> = self
            .get_json(&format!("{}/worksheets", item.workbook_path()))
            .await?;
        Ok(list.value)
    }

    async fn list_tables(
        &self,
        item: &ItemRef,
        worksheet_id: &str,
    ) -> ClientResult<Vec<TableInfo>> {
        let list: ODataList<TableInfo> = self
            .get_json(&format!(
                "{}/worksheets/{}/tables",
                item.workbook_path(),
                worksheet_id
            ))
            .await?;
        Ok(list.value)
    }

    async fn list_columns(&self, table: &TableRef) -> ClientResult<Vec<ColumnInfo>> {
        let list: ODataList<ColumnInfo> = self
            .get_json(&format!("{}/columns?$select=id,name,index", table.table_path()))
            .await?;
        Ok(list.value)
    }

    async fn column_values(&self, table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        let range: RangeValues = self.get_json(&table.column_path(index)).await?;
        Ok(first_column(range))
    }

    async fn row_values(&self, table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        let range: RangeValues = self.get_json(&table.row_path(index)).await?;
        Ok(first_row(range))
    }

    async fn add_row(&self, table: &TableRef, values: &[Value]) -> ClientResult<()> {
        self.send_values(Method::POST, &table.rows_path(), values).await
    }

    async fn update_row(
        &self,
        table: &TableRef,
        index: usize,
        values: &[Value],
    ) -> ClientResult<()> {
        self.send_values(Method::PATCH, &table.row_path(index), values)
            .await
    }

    async fn delete_row(&self, table: &TableRef, index: usize) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &table.row_path(index)).await?;
        self.send(request).await?;
        Ok(())
    }

    async fn download_content(&self, item: &ItemRef) -> ClientResult<Vec<u8>> {
        // Graph answers with a redirect to a pre-signed URL; reqwest follows it
        // and drops the Authorization header on the cross-host hop.
        let request = self
            .request(Method::GET, &format!("{}/content", item.item_path()))
            .await?;
        let response = self.send(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn upload_content(&self, item: &ItemRef, content: Vec<u8>) -> ClientResult<()> {
        let request = self
            .request(Method::PUT, &format!("{}/content", item.item_path()))
            .await?
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header("Prefer", PREFER_BYPASS_SHARED_LOCK)
            .body(content);
        self.send(request).await?;
        Ok(())
    }

    async fn upload_by_path(
        &self,
        site_id: &str,
        path: &str,
        content: Vec<u8>,
    ) -> ClientResult<()> {
        let path = path.trim_start_matches('/');
        let request = self
            .request(
                Method::PUT,
                &format!("sites/{site_id}/drive/root:/{path}:/content"),
            )
            .await?
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header("Prefer", PREFER_BYPASS_SHARED_LOCK)
            .body(content);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_item(&self, item: &ItemRef) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &item.item_path()).await?;
        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(ClientError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
