//! Session Context
//!
//! Per-event cache of everything resolved on the way to a table: site id,
//! file path, drive item, worksheet, table and header map. A value is
//! memoized once resolved and never invalidated for the lifetime of the
//! session; failed resolutions are not cached.
//!
//! A session is owned by exactly one synchronization call. Create a new one
//! for every site of every event.

use std::collections::HashMap;

use rulesheet_client::{ColumnInfo, ItemRef, TableRef};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// The site a record is synchronized to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTarget {
    /// Brand, selects the SharePoint site
    #[serde(default)]
    pub brand: Option<String>,
    /// Store code, selects the workbook and the locale
    pub store_code: String,
}

impl SiteTarget {
    pub fn new(brand: impl Into<String>, store_code: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            store_code: store_code.into(),
        }
    }

    /// Locale used to pick localized text for this site
    pub fn locale(&self) -> &str {
        &self.store_code
    }
}

/// Column name → column index, derived from the table's live columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    /// Build from header cells in column order, skipping blank names
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        let columns = names
            .into_iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let name = name.as_ref().trim();
                (!name.is_empty()).then(|| (name.to_string(), index))
            })
            .collect();
        Self { columns }
    }

    /// Build from column metadata, skipping columns without a name
    pub fn from_columns<'a>(columns: impl IntoIterator<Item = &'a ColumnInfo>) -> Self {
        let columns = columns
            .into_iter()
            .filter_map(|col| match col.name.as_deref() {
                Some(name) if !name.is_empty() => Some((name.to_string(), col.index)),
                _ => None,
            })
            .collect();
        Self { columns }
    }

    /// Index of a column; `None` is the "not found" sentinel
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Per-event resolution cache
#[derive(Debug, Clone)]
pub struct SessionContext {
    target: SiteTarget,
    pub(crate) site_id: Option<String>,
    pub(crate) file_path: Option<String>,
    pub(crate) item: Option<ItemRef>,
    pub(crate) worksheet_id: Option<String>,
    pub(crate) table: Option<TableRef>,
    pub(crate) header_map: Option<HeaderMap>,
    deadline: Option<Instant>,
}

impl SessionContext {
    pub fn new(target: SiteTarget) -> Self {
        Self {
            target,
            site_id: None,
            file_path: None,
            item: None,
            worksheet_id: None,
            table: None,
            header_map: None,
            deadline: None,
        }
    }

    /// Bound lock retries of this session's writes
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn target(&self) -> &SiteTarget {
        &self.target
    }

    pub fn store_code(&self) -> &str {
        &self.target.store_code
    }

    /// Resolved table address, if resolution already ran
    pub fn table(&self) -> Option<&TableRef> {
        self.table.as_ref()
    }

    pub fn header_map(&self) -> Option<&HeaderMap> {
        self.header_map.as_ref()
    }
}
