//! Workbook API trait
//!
//! The operations the sync engine needs from the remote store. `GraphClient`
//! implements it over HTTP; tests substitute an in-memory workbook.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientResult;
use crate::types::{ColumnInfo, ItemRef, TableInfo, TableRef, Worksheet};

#[async_trait]
pub trait WorkbookApi: Send + Sync {
    /// Resolve a site id from `hostname:/server-relative-path`
    async fn site_id(&self, url_key: &str) -> ClientResult<Option<String>>;

    /// Resolve a drive-relative file path to a drive item id
    async fn drive_item_id(&self, site_id: &str, path: &str) -> ClientResult<Option<String>>;

    async fn list_worksheets(&self, item: &ItemRef) -> ClientResult<Vec<Worksheet>>;

    async fn list_tables(&self, item: &ItemRef, worksheet_id: &str) -> ClientResult<Vec<TableInfo>>;

    async fn list_columns(&self, table: &TableRef) -> ClientResult<Vec<ColumnInfo>>;

    /// All cells of a column, header cell first
    async fn column_values(&self, table: &TableRef, index: usize) -> ClientResult<Vec<Value>>;

    /// Cells of the data row at `index` (0-based, header excluded)
    async fn row_values(&self, table: &TableRef, index: usize) -> ClientResult<Vec<Value>>;

    /// Append a row
    async fn add_row(&self, table: &TableRef, values: &[Value]) -> ClientResult<()>;

    /// Overwrite the data row at `index`
    async fn update_row(
        &self,
        table: &TableRef,
        index: usize,
        values: &[Value],
    ) -> ClientResult<()>;

    /// Remove the data row at `index`
    async fn delete_row(&self, table: &TableRef, index: usize) -> ClientResult<()>;

    /// Raw file content (whole-file path)
    async fn download_content(&self, item: &ItemRef) -> ClientResult<Vec<u8>>;

    /// Replace the raw file content, bypassing shared (co-authoring) locks
    async fn upload_content(&self, item: &ItemRef, content: Vec<u8>) -> ClientResult<()>;

    /// Create or replace a file by drive-relative path
    async fn upload_by_path(&self, site_id: &str, path: &str, content: Vec<u8>) -> ClientResult<()>;

    /// Delete the file; an already absent file is not an error
    async fn delete_item(&self, item: &ItemRef) -> ClientResult<()>;
}
