//! Graph workbook payloads and resource addresses

use serde::Deserialize;
use serde_json::Value;

/// List wrapper used by every Graph collection response
#[derive(Debug, Deserialize)]
pub(crate) struct ODataList<T> {
    pub value: Vec<T>,
}

/// Drive item identity (site + file)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub site_id: String,
    pub item_id: String,
}

impl ItemRef {
    pub fn new(site_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Path of the drive item, relative to the Graph base URL
    pub fn item_path(&self) -> String {
        format!("sites/{}/drive/items/{}", self.site_id, self.item_id)
    }

    /// Path of the item's workbook
    pub fn workbook_path(&self) -> String {
        format!("{}/workbook", self.item_path())
    }
}

/// Table identity inside a workbook
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub item: ItemRef,
    pub table_id: String,
}

impl TableRef {
    pub fn new(item: ItemRef, table_id: impl Into<String>) -> Self {
        Self {
            item,
            table_id: table_id.into(),
        }
    }

    /// Path of the table, relative to the Graph base URL
    pub fn table_path(&self) -> String {
        format!("{}/tables/{}", self.item.workbook_path(), self.table_id)
    }

    pub fn rows_path(&self) -> String {
        format!("{}/rows", self.table_path())
    }

    pub fn row_path(&self, index: usize) -> String {
        format!("{}/rows/itemAt(index={})", self.table_path(), index)
    }

    pub fn column_path(&self, index: usize) -> String {
        format!("{}/columns/itemAt(index={})", self.table_path(), index)
    }
}

/// Worksheet metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Worksheet {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: i64,
    /// "Visible", "Hidden" or "VeryHidden"
    #[serde(default)]
    pub visibility: String,
}

impl Worksheet {
    pub fn is_visible(&self) -> bool {
        self.visibility.eq_ignore_ascii_case("visible")
    }
}

/// Table metadata
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Table column metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub index: usize,
}

/// Cell payload of a range/row/column: 2-D array of values
#[derive(Debug, Deserialize)]
pub(crate) struct RangeValues {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

/// Drive item metadata (only the id is used)
#[derive(Debug, Deserialize)]
pub(crate) struct DriveItem {
    #[serde(default)]
    pub id: Option<String>,
}

/// Site metadata (only the id is used)
#[derive(Debug, Deserialize)]
pub(crate) struct Site {
    #[serde(default)]
    pub id: Option<String>,
}
