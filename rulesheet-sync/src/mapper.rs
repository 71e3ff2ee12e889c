//! Record mapper: project a sales rule onto a table row.

use serde_json::{Map, Value, json};
use shared::{RecordField, SalesRule};

use crate::engine::SyncEngine;
use crate::log::SyncLog;

/// Row values for `record`, in declared field order
///
/// Absent fields are skipped, so the result is shorter than
/// [`RecordField::COUNT`] unless every field is present.
pub fn map_record(record: &SalesRule, locale: &str, log: &dyn SyncLog) -> Vec<Value> {
    RecordField::ALL
        .iter()
        .filter_map(|&field| {
            let value = record.get(field)?;
            Some(match field {
                RecordField::Status => normalize_bool(value),
                f if f.is_localized() => localize(field, value, locale, log),
                _ => value.clone(),
            })
        })
        .collect()
}

/// 1 for truthy forms (`true`, `1`, `"1"`, `"on"`, `"yes"`, `"true"`), else 0
pub fn normalize_bool(value: &Value) -> Value {
    let truthy = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "on" | "yes" | "true"
        ),
        _ => false,
    };
    json!(if truthy { 1 } else { 0 })
}

fn localize(field: RecordField, value: &Value, locale: &str, log: &dyn SyncLog) -> Value {
    let parsed;
    let map: &Map<String, Value> = match value {
        Value::Object(map) => map,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => {
                parsed = map;
                &parsed
            }
            _ => {
                log.debug(&format!("{field} is not a locale map, kept as-is"));
                return value.clone();
            }
        },
        _ => return value.clone(),
    };

    match map.get(locale) {
        Some(text) => text.clone(),
        None => {
            log.debug(&format!("{field} has no text for locale {locale}, kept as-is"));
            value.clone()
        }
    }
}

impl SyncEngine {
    pub fn map_record(&self, record: &SalesRule, locale: &str) -> Vec<Value> {
        map_record(record, locale, self.log.as_ref())
    }
}
