//! Whole-file workbook editing
//!
//! Row lookup and cell writes on a downloaded xlsx file, for stores kept as
//! plain workbooks rather than Graph tables. The first worksheet holds the
//! promotions; row 1 carries the column names and data starts on row 2.
//! Row indexes returned here count data rows from 0, like the table path.

use std::io::Cursor;

use serde_json::{Value, json};
use shared::RecordField;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::{Resource, SyncError, SyncResult};
use crate::executor::UpsertOutcome;
use crate::locator::coerce_int;
use crate::session::HeaderMap;

const HEADER_ROW: u32 = 1;

/// Parsed workbook file
pub struct WorkbookFile {
    book: Spreadsheet,
}

impl WorkbookFile {
    pub fn parse(content: &[u8]) -> SyncResult<Self> {
        let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(content), true)
            .map_err(|e| SyncError::Workbook(format!("file is not a readable xlsx: {e}")))?;
        let file = Self { book };
        file.sheet()?;
        Ok(file)
    }

    pub fn to_bytes(&self) -> SyncResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&self.book, &mut out)
            .map_err(|e| SyncError::Workbook(format!("xlsx could not be written: {e}")))?;
        Ok(out.into_inner())
    }

    fn sheet(&self) -> SyncResult<&Worksheet> {
        self.book
            .get_sheet(&0)
            .ok_or_else(|| SyncError::NotFound(Resource::Worksheet, "worksheet in file".into()))
    }

    fn sheet_mut(&mut self) -> SyncResult<&mut Worksheet> {
        self.book
            .get_sheet_mut(&0)
            .ok_or_else(|| SyncError::NotFound(Resource::Worksheet, "worksheet in file".into()))
    }

    /// Column name → index from the header row
    pub fn header_map(&self) -> SyncResult<HeaderMap> {
        let sheet = self.sheet()?;
        let names = (1..=sheet.get_highest_column()).map(|col| cell_text(sheet, col, HEADER_ROW));
        let headers = HeaderMap::from_names(names);
        if headers.is_empty() {
            return Err(SyncError::NotFound(
                Resource::Table,
                format!("header row of worksheet {}", sheet.get_name()),
            ));
        }
        Ok(headers)
    }

    /// Number of rows under the header
    pub fn data_rows(&self) -> SyncResult<usize> {
        let highest = self.sheet()?.get_highest_row();
        Ok(highest.saturating_sub(HEADER_ROW) as usize)
    }

    /// Data row whose cell in `column` equals `key` as an integer
    pub fn find_row(&self, column: usize, key: &Value) -> SyncResult<Option<usize>> {
        let Some(wanted) = coerce_int(key) else {
            return Ok(None);
        };
        let sheet = self.sheet()?;
        let col = sheet_col(column);
        let found = (HEADER_ROW + 1..=sheet.get_highest_row())
            .find(|&row| coerce_int(&Value::String(cell_text(sheet, col, row))) == Some(wanted));
        Ok(found.map(|row| (row - HEADER_ROW - 1) as usize))
    }

    /// Cell text of a data row, in column order
    pub fn row_text(&self, row: usize) -> SyncResult<Vec<String>> {
        let sheet = self.sheet()?;
        let sheet_row = sheet_row(row);
        Ok((1..=sheet.get_highest_column())
            .map(|col| cell_text(sheet, col, sheet_row))
            .collect())
    }

    /// Write a complete mapped record, overwriting its row or appending one
    ///
    /// `values` are in declared field order. Each field lands in the column
    /// named after it, so the sheet's column order does not matter.
    pub fn upsert(&mut self, values: &[Value]) -> SyncResult<UpsertOutcome> {
        if values.len() != RecordField::COUNT {
            return Err(SyncError::Schema(format!(
                "record maps to {} values, worksheet expects {}",
                values.len(),
                RecordField::COUNT
            )));
        }
        let headers = self.header_map()?;
        let columns = RecordField::ALL
            .iter()
            .map(|field| require_column(&headers, *field))
            .collect::<SyncResult<Vec<_>>>()?;

        let key = &values[RecordField::ScheduleId as usize];
        let existing = self.find_row(columns[RecordField::ScheduleId as usize], key)?;
        let row = match existing {
            Some(row) => row,
            None => self.data_rows()?,
        };

        let sheet = self.sheet_mut()?;
        for (column, value) in columns.iter().zip(values) {
            write_cell(sheet, sheet_col(*column), sheet_row(row), value);
        }

        Ok(match existing {
            Some(row) => UpsertOutcome::Updated { row },
            None => UpsertOutcome::Created,
        })
    }

    /// Set `status` to 0 on the row of `schedule_id`
    pub fn deactivate(&mut self, schedule_id: &Value) -> SyncResult<usize> {
        let headers = self.header_map()?;
        let status = require_column(&headers, RecordField::Status)?;
        let key_column = require_column(&headers, RecordField::ScheduleId)?;
        let row = self.find_row(key_column, schedule_id)?.ok_or_else(|| {
            SyncError::NotFound(Resource::Row, format!("row for schedule {schedule_id}"))
        })?;

        let sheet = self.sheet_mut()?;
        write_cell(sheet, sheet_col(status), sheet_row(row), &json!(0));
        Ok(row)
    }

    /// Remove the row of `schedule_id`, shifting later rows up
    ///
    /// `Ok(false)` when there was no such row.
    pub fn delete(&mut self, schedule_id: &Value) -> SyncResult<bool> {
        let headers = self.header_map()?;
        let key_column = require_column(&headers, RecordField::ScheduleId)?;
        let Some(row) = self.find_row(key_column, schedule_id)? else {
            return Ok(false);
        };

        self.sheet_mut()?.remove_row(&sheet_row(row), &1);
        Ok(true)
    }
}

fn require_column(headers: &HeaderMap, field: RecordField) -> SyncResult<usize> {
    headers
        .get(field.name())
        .ok_or_else(|| SyncError::Schema(format!("{} column not in worksheet", field.name())))
}

fn sheet_col(column: usize) -> u32 {
    column as u32 + 1
}

fn sheet_row(row: usize) -> u32 {
    row as u32 + HEADER_ROW + 1
}

fn cell_text(sheet: &Worksheet, col: u32, row: u32) -> String {
    sheet
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

fn write_cell(sheet: &mut Worksheet, col: u32, row: u32, value: &Value) {
    let cell = sheet.get_cell_mut((col, row));
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(number) => {
                cell.set_value_number(number);
            }
            None => {
                cell.set_value_string(n.to_string());
            }
        },
        Value::Bool(b) => {
            cell.set_value_bool(*b);
        }
        Value::String(s) => {
            cell.set_value_string(s.clone());
        }
        Value::Null => {
            cell.set_value_string(String::new());
        }
        other => {
            cell.set_value_string(other.to_string());
        }
    }
}
