//! In-memory workbook used by the engine tests

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rulesheet_client::{
    ClientError, ClientResult, ColumnInfo, ItemRef, TableInfo, TableRef, WorkbookApi, Worksheet,
};
use serde_json::{Value, json};
use shared::{RecordField, SiteDirectory, SiteRef, StoreLocation};

use crate::engine::SyncEngine;
use crate::log::SyncLog;
use crate::workbook::WorkbookFile;

pub const ACME_URL_KEY: &str = "acme.sharepoint.com:/sites/AcmePromotions";

#[derive(Default)]
struct State {
    calls: Vec<String>,
    sites: HashMap<String, String>,
    items: HashMap<String, String>,
    removed_items: HashMap<String, String>,
    worksheets: Vec<Worksheet>,
    tables: HashMap<String, Vec<TableInfo>>,
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
    content: HashMap<String, Vec<u8>>,
    locked_writes: usize,
    locked_forever: bool,
    write_error: Option<String>,
}

/// Shared handle to a fake workbook; clones observe the same state
#[derive(Clone, Default)]
pub struct FakeWorkbook {
    state: Arc<Mutex<State>>,
}

impl FakeWorkbook {
    /// One promotions workbook per store, a table whose columns are the
    /// recognized record fields, and no rows
    pub fn promotions() -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.sites.insert(ACME_URL_KEY.into(), "site-1".into());
            state
                .items
                .insert("Promotions/UAE/Promotions.xlsx".into(), "item-1".into());
            state
                .items
                .insert("Promotions/USA/Promotions.xlsx".into(), "item-2".into());
            state.worksheets = vec![
                worksheet("ws-hidden", "Archive", "Hidden"),
                worksheet("ws-1", "Promotions", "Visible"),
            ];
            state
                .tables
                .insert("ws-1".into(), vec![table("T1", "Promotions")]);
            state
                .tables
                .insert("ws-pinned".into(), vec![table("T-pinned", "Pinned")]);
            state.columns = RecordField::ALL
                .iter()
                .enumerate()
                .map(|(index, field)| ColumnInfo {
                    id: Some(index.to_string()),
                    name: Some(field.name().to_string()),
                    index,
                })
                .collect();
            state.content.insert("item-1".into(), promotions_xlsx());
            state.content.insert("item-2".into(), promotions_xlsx());
        }
        fake
    }

    /// Directory matching [`FakeWorkbook::promotions`]
    pub fn directory() -> SiteDirectory {
        SiteDirectory::default()
            .with_brand("acme", SiteRef::UrlKey(ACME_URL_KEY.into()))
            .with_brand(
                "globex",
                SiteRef::Direct {
                    site_id: "site-1".into(),
                },
            )
            .with_store("AE", StoreLocation::Segment("UAE".into()))
            .with_store(
                "US",
                StoreLocation::Descriptor {
                    segment: "USA".into(),
                    worksheet_id: Some("ws-pinned".into()),
                },
            )
    }

    fn record(&self, call: &str) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        state
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == call)
            .count()
    }

    pub fn remove_items(&self) {
        let mut state = self.state.lock().unwrap();
        let items = std::mem::take(&mut state.items);
        state.removed_items.extend(items);
    }

    pub fn restore_items(&self) {
        let mut state = self.state.lock().unwrap();
        let items = std::mem::take(&mut state.removed_items);
        state.items.extend(items);
    }

    pub fn hide_all_worksheets(&self) {
        let mut state = self.state.lock().unwrap();
        for ws in &mut state.worksheets {
            ws.visibility = "Hidden".into();
        }
    }

    pub fn clear_tables(&self) {
        self.state.lock().unwrap().tables.clear();
    }

    pub fn set_columns(&self, columns: Vec<ColumnInfo>) {
        self.state.lock().unwrap().columns = columns;
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.state.lock().unwrap().rows.clone()
    }

    pub fn push_row(&self, row: Vec<Value>) {
        self.state.lock().unwrap().rows.push(row);
    }

    pub fn item_for(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().items.get(path).cloned()
    }

    pub fn content(&self, item_id: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().content.get(item_id).cloned()
    }

    pub fn set_content(&self, item_id: &str, content: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .content
            .insert(item_id.to_string(), content);
    }

    /// Parsed copy of the stored file of `item_id`
    pub fn workbook(&self, item_id: &str) -> WorkbookFile {
        let content = self.content(item_id).expect("item has content");
        WorkbookFile::parse(&content).expect("stored content is xlsx")
    }

    /// The next `count` writes fail with the lock signal
    pub fn lock_writes(&self, count: usize) {
        self.state.lock().unwrap().locked_writes = count;
    }

    /// Every write fails with the lock signal until unlocked
    pub fn lock_forever(&self) {
        self.state.lock().unwrap().locked_forever = true;
    }

    /// Every write fails with a non-lock error
    pub fn fail_writes(&self, message: &str) {
        self.state.lock().unwrap().write_error = Some(message.to_string());
    }

    fn check_write(state: &mut State) -> ClientResult<()> {
        if let Some(message) = &state.write_error {
            return Err(ClientError::Api {
                status: 500,
                code: "generalException".into(),
                message: message.clone(),
            });
        }
        if state.locked_forever {
            return Err(ClientError::Locked("The workbook is locked".into()));
        }
        if state.locked_writes > 0 {
            state.locked_writes -= 1;
            return Err(ClientError::Locked("The workbook is locked".into()));
        }
        Ok(())
    }
}

fn worksheet(id: &str, name: &str, visibility: &str) -> Worksheet {
    Worksheet {
        id: id.into(),
        name: name.into(),
        position: 0,
        visibility: visibility.into(),
    }
}

fn table(id: &str, name: &str) -> TableInfo {
    TableInfo {
        id: id.into(),
        name: name.into(),
    }
}

fn row_not_found(index: usize) -> ClientError {
    ClientError::NotFound(format!("row {index}"))
}

#[async_trait]
impl WorkbookApi for FakeWorkbook {
    async fn site_id(&self, url_key: &str) -> ClientResult<Option<String>> {
        Ok(self.record("site_id").sites.get(url_key).cloned())
    }

    async fn drive_item_id(&self, _site_id: &str, path: &str) -> ClientResult<Option<String>> {
        Ok(self.record("drive_item_id").items.get(path).cloned())
    }

    async fn list_worksheets(&self, _item: &ItemRef) -> ClientResult<Vec<Worksheet>> {
        Ok(self.record("list_worksheets").worksheets.clone())
    }

    async fn list_tables(
        &self,
        _item: &ItemRef,
        worksheet_id: &str,
    ) -> ClientResult<Vec<TableInfo>> {
        Ok(self
            .record("list_tables")
            .tables
            .get(worksheet_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_columns(&self, _table: &TableRef) -> ClientResult<Vec<ColumnInfo>> {
        Ok(self.record("list_columns").columns.clone())
    }

    async fn column_values(&self, _table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        let state = self.record("column_values");
        let header = state
            .columns
            .iter()
            .find(|c| c.index == index)
            .and_then(|c| c.name.clone())
            .map(Value::String)
            .unwrap_or(Value::Null);
        let cells = state
            .rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(Value::Null));
        Ok(std::iter::once(header).chain(cells).collect())
    }

    async fn row_values(&self, _table: &TableRef, index: usize) -> ClientResult<Vec<Value>> {
        self.record("row_values")
            .rows
            .get(index)
            .cloned()
            .ok_or_else(|| row_not_found(index))
    }

    async fn add_row(&self, _table: &TableRef, values: &[Value]) -> ClientResult<()> {
        let mut state = self.record("add_row");
        Self::check_write(&mut state)?;
        state.rows.push(values.to_vec());
        Ok(())
    }

    async fn update_row(
        &self,
        _table: &TableRef,
        index: usize,
        values: &[Value],
    ) -> ClientResult<()> {
        let mut state = self.record("update_row");
        Self::check_write(&mut state)?;
        let row = state.rows.get_mut(index).ok_or_else(|| row_not_found(index))?;
        *row = values.to_vec();
        Ok(())
    }

    async fn delete_row(&self, _table: &TableRef, index: usize) -> ClientResult<()> {
        let mut state = self.record("delete_row");
        Self::check_write(&mut state)?;
        if index >= state.rows.len() {
            return Err(row_not_found(index));
        }
        state.rows.remove(index);
        Ok(())
    }

    async fn download_content(&self, item: &ItemRef) -> ClientResult<Vec<u8>> {
        self.record("download_content")
            .content
            .get(&item.item_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("item {}", item.item_id)))
    }

    async fn upload_content(&self, item: &ItemRef, content: Vec<u8>) -> ClientResult<()> {
        let mut state = self.record("upload_content");
        Self::check_write(&mut state)?;
        state.content.insert(item.item_id.clone(), content);
        Ok(())
    }

    async fn upload_by_path(
        &self,
        _site_id: &str,
        path: &str,
        content: Vec<u8>,
    ) -> ClientResult<()> {
        let mut state = self.record("upload_by_path");
        let item_id = match state.items.get(path) {
            Some(id) => id.clone(),
            None => {
                let id = format!("uploaded-{}", state.calls.len());
                state.items.insert(path.to_string(), id.clone());
                id
            }
        };
        state.content.insert(item_id, content);
        Ok(())
    }

    async fn delete_item(&self, item: &ItemRef) -> ClientResult<()> {
        let mut state = self.record("delete_item");
        state.content.remove(&item.item_id);
        state.items.retain(|_, id| id != &item.item_id);
        state.locked_forever = false;
        state.locked_writes = 0;
        Ok(())
    }
}

/// Single-sheet xlsx whose header row is `names`
pub fn sheet_with_headers(names: &[&str]) -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new file has a sheet");
    for (i, name) in names.iter().enumerate() {
        sheet
            .get_cell_mut((i as u32 + 1, 1))
            .set_value_string(name.to_string());
    }
    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out).expect("xlsx written");
    out.into_inner()
}

/// Promotions workbook with the recognized fields as headers and no rows
pub fn promotions_xlsx() -> Vec<u8> {
    let names: Vec<&str> = RecordField::ALL.iter().map(|f| f.name()).collect();
    sheet_with_headers(&names)
}

/// Log sink that keeps every message
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl SyncLog for MemoryLog {
    fn debug(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("DEBUG {message}"));
    }

    fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("INFO {message}"));
    }
}

/// Engine wired to the fake and its matching directory
pub fn engine_with(fake: &FakeWorkbook) -> SyncEngine {
    SyncEngine::new(Arc::new(fake.clone()), Arc::new(FakeWorkbook::directory()))
}

/// Engine wired to the fake plus the log it writes to
pub fn engine_with_log(fake: &FakeWorkbook) -> (SyncEngine, Arc<MemoryLog>) {
    let log = Arc::new(MemoryLog::default());
    let engine = engine_with(fake).with_log(log.clone());
    (engine, log)
}

/// A complete record for `schedule_id`
pub fn full_rule(schedule_id: i64) -> shared::SalesRule {
    shared::SalesRule::default()
        .with(RecordField::ScheduleId, schedule_id)
        .with(RecordField::RuleId, 900 + schedule_id)
        .with(RecordField::RuleName, format!("Rule {schedule_id}"))
        .with(RecordField::CouponType, "auto")
        .with(
            RecordField::WebDescription,
            json!({"US": "Hello", "AE": "مرحبا"}).to_string(),
        )
        .with(RecordField::AppDescription, "App text")
        .with(RecordField::WebTerms, "Web terms")
        .with(RecordField::AppTerms, "App terms")
        .with(RecordField::UrlKey, format!("rule-{schedule_id}"))
        .with(RecordField::ShowOnWeb, 1)
        .with(RecordField::ShowOnApp, 0)
        .with(RecordField::StartDate, "2026-01-01")
        .with(RecordField::EndDate, "2026-12-31")
        .with(RecordField::Status, "yes")
}
