//! Canned workbook for handler tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use rulesheet_client::{
    ClientError, ClientResult, ColumnInfo, ItemRef, TableInfo, TableRef, WorkbookApi, Worksheet,
};
use rulesheet_sync::{RetryPolicy, SyncEngine};
use serde_json::Value;
use shared::{RecordField, SiteDirectory, SiteRef, StoreLocation};

use crate::config::Config;
use crate::state::AppState;

/// One empty promotions table on every site; records appended rows
#[derive(Clone, Default)]
pub struct StubWorkbook {
    added: Arc<Mutex<Vec<Vec<Value>>>>,
    locked: bool,
}

impl StubWorkbook {
    pub fn locked() -> Self {
        Self {
            locked: true,
            ..Self::default()
        }
    }

    pub fn added_rows(&self) -> Vec<Vec<Value>> {
        self.added.lock().unwrap().clone()
    }

    fn check_lock(&self) -> ClientResult<()> {
        if self.locked {
            return Err(ClientError::Locked("The workbook is locked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkbookApi for StubWorkbook {
    async fn site_id(&self, _url_key: &str) -> ClientResult<Option<String>> {
        Ok(Some("site-1".into()))
    }

    async fn drive_item_id(&self, _site_id: &str, _path: &str) -> ClientResult<Option<String>> {
        Ok(Some("item-1".into()))
    }

    async fn list_worksheets(&self, _item: &ItemRef) -> ClientResult<Vec<Worksheet>> {
        Ok(vec![Worksheet {
            id: "ws-1".into(),
            name: "Promotions".into(),
            position: 0,
            visibility: "Visible".into(),
        }])
    }

    async fn list_tables(
        &self,
        _item: &ItemRef,
        _worksheet_id: &str,
    ) -> ClientResult<Vec<TableInfo>> {
        Ok(vec![TableInfo {
            id: "T1".into(),
            name: "Promotions".into(),
        }])
    }

    async fn list_columns(&self, _table: &TableRef) -> ClientResult<Vec<ColumnInfo>> {
        Ok(RecordField::ALL
            .iter()
            .enumerate()
            .map(|(index, field)| ColumnInfo {
                id: None,
                name: Some(field.name().to_string()),
                index,
            })
            .collect())
    }

    async fn column_values(&self, _table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        let header = RecordField::ALL
            .get(index)
            .map(|f| Value::from(f.name()))
            .unwrap_or(Value::Null);
        Ok(vec![header])
    }

    async fn row_values(&self, _table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        Err(ClientError::NotFound(format!("row {index}")))
    }

    async fn add_row(&self, _table: &TableRef, values: &[Value]) -> ClientResult<()> {
        self.check_lock()?;
        self.added.lock().unwrap().push(values.to_vec());
        Ok(())
    }

    async fn update_row(
        &self,
        _table: &TableRef,
        _index: usize,
        _values: &[Value],
    ) -> ClientResult<()> {
        self.check_lock()
    }

    async fn delete_row(&self, _table: &TableRef, _index: usize) -> ClientResult<()> {
        self.check_lock()
    }

    async fn download_content(&self, _item: &ItemRef) -> ClientResult<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn upload_content(&self, _item: &ItemRef, _content: Vec<u8>) -> ClientResult<()> {
        self.check_lock()
    }

    async fn upload_by_path(
        &self,
        _site_id: &str,
        _path: &str,
        _content: Vec<u8>,
    ) -> ClientResult<()> {
        Ok(())
    }

    async fn delete_item(&self, _item: &ItemRef) -> ClientResult<()> {
        Ok(())
    }
}

fn engine(stub: &StubWorkbook) -> SyncEngine {
    let directory = SiteDirectory::default()
        .with_brand(
            "acme",
            SiteRef::UrlKey("acme.sharepoint.com:/sites/Promotions".into()),
        )
        .with_store("AE", StoreLocation::Segment("UAE".into()));
    SyncEngine::new(Arc::new(stub.clone()), Arc::new(directory))
}

/// Router over `stub` with brand `acme` and store `AE`, fast retries
pub fn app(stub: &StubWorkbook) -> Router {
    let engine = engine(stub)
        .with_retry_policy(RetryPolicy::new(Duration::from_millis(1), Duration::from_millis(5)));

    super::router(Arc::new(AppState { engine }), Duration::from_secs(30))
}

/// Router over `stub` with the retry policy, event budget and handler
/// timeout a server gets from an otherwise empty environment
pub fn app_with_defaults(stub: &StubWorkbook) -> Router {
    let config = Config::from_lookup(|name: &str| match name {
        "AZURE_TENANT_ID" | "AZURE_CLIENT_ID" | "AZURE_CLIENT_SECRET" => Some("x".into()),
        "SITE_DIRECTORY_PATH" => Some("sites.json".into()),
        _ => None,
    })
    .unwrap();
    let engine = engine(stub).with_event_budget(config.sync_budget);

    super::router(Arc::new(AppState { engine }), config.handler_timeout())
}
