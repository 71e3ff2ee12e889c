//! Row locator: find a data row by the integer value of one column.

use serde_json::Value;

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::session::SessionContext;

/// Integer value of a cell or key
///
/// Numbers are truncated; strings yield their leading integer part after
/// trimming (`" 42abc"` → 42). Anything else has no integer value.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s.trim()),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let (sign, digits) = match s.as_bytes().first()? {
        b'-' => (-1, &s[1..]),
        b'+' => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl SyncEngine {
    /// Data-row index (0-based, header excluded) whose `column` cell equals
    /// `key`, or `None` when no row matches
    pub async fn find_row_index(
        &self,
        session: &mut SessionContext,
        column: &str,
        key: &Value,
    ) -> SyncResult<Option<usize>> {
        let headers = self.resolve_header_map(session).await?;
        let index = headers
            .get(column)
            .ok_or_else(|| SyncError::Schema(format!("column {column} not in table")))?;

        let Some(wanted) = coerce_int(key) else {
            self.log.info(&format!("Key {key} for {column} is not numeric, no row matched"));
            return Ok(None);
        };

        let table = self.resolve_table_id(session).await?;
        let cells = self.api.column_values(&table, index).await?;

        let row = cells
            .iter()
            .skip(1)
            .position(|cell| coerce_int(cell) == Some(wanted));

        match row {
            Some(row) => self.log.debug(&format!("{column}={wanted} found at row {row}")),
            None => self.log.debug(&format!("{column}={wanted} not found")),
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SiteTarget;
    use crate::testing::{FakeWorkbook, engine_with, engine_with_log};
    use serde_json::json;
    use shared::RecordField;

    fn row_with_id(id: Value) -> Vec<Value> {
        let mut row = vec![json!(""); RecordField::COUNT];
        row[0] = id;
        row
    }

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int(&json!(42)), Some(42));
        assert_eq!(coerce_int(&json!(42.9)), Some(42));
        assert_eq!(coerce_int(&json!("42")), Some(42));
        assert_eq!(coerce_int(&json!(" -7 ")), Some(-7));
        assert_eq!(coerce_int(&json!("42abc")), Some(42));
        assert_eq!(coerce_int(&json!("abc")), None);
        assert_eq!(coerce_int(&json!("")), None);
        assert_eq!(coerce_int(&json!("-")), None);
        assert_eq!(coerce_int(&json!(null)), None);
        assert_eq!(coerce_int(&json!(true)), None);
    }

    #[tokio::test]
    async fn test_finds_row_by_coerced_key() {
        let fake = FakeWorkbook::promotions();
        for id in ["10", "42", "7"] {
            fake.push_row(row_with_id(json!(id)));
        }
        let engine = engine_with(&fake);
        let mut session = engine.session(SiteTarget::new("acme", "AE"));

        let index = engine
            .find_row_index(&mut session, "schedule_id", &json!(42))
            .await
            .unwrap();
        assert_eq!(index, Some(1));

        let index = engine
            .find_row_index(&mut session, "schedule_id", &json!("7"))
            .await
            .unwrap();
        assert_eq!(index, Some(2));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let fake = FakeWorkbook::promotions();
        fake.push_row(row_with_id(json!(10)));
        let engine = engine_with(&fake);
        let mut session = engine.session(SiteTarget::new("acme", "AE"));

        let index = engine
            .find_row_index(&mut session, "schedule_id", &json!(99))
            .await
            .unwrap();
        assert_eq!(index, None);
    }

    #[tokio::test]
    async fn test_header_cell_never_matches() {
        let fake = FakeWorkbook::promotions();
        let engine = engine_with(&fake);
        let mut session = engine.session(SiteTarget::new("acme", "AE"));

        // header cell is "schedule_id", rows are empty
        let index = engine
            .find_row_index(&mut session, "schedule_id", &json!(0))
            .await
            .unwrap();
        assert_eq!(index, None);
    }

    #[tokio::test]
    async fn test_unknown_column_is_schema_error() {
        let fake = FakeWorkbook::promotions();
        let engine = engine_with(&fake);
        let mut session = engine.session(SiteTarget::new("acme", "AE"));

        let err = engine
            .find_row_index(&mut session, "sku", &json!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Schema(_)));
        assert_eq!(fake.call_count("column_values"), 0);
    }

    #[tokio::test]
    async fn test_non_numeric_key_matches_nothing() {
        let fake = FakeWorkbook::promotions();
        fake.push_row(row_with_id(json!("abc")));
        let (engine, log) = engine_with_log(&fake);
        let mut session = engine.session(SiteTarget::new("acme", "AE"));

        let index = engine
            .find_row_index(&mut session, "schedule_id", &json!("abc"))
            .await
            .unwrap();
        assert_eq!(index, None);
        assert_eq!(fake.call_count("column_values"), 0);
        assert!(log.contains("not numeric"));
    }
}
