//! Sales Rule Record
//!
//! The promotion record pushed from the commerce system. Every field is
//! optional: an absent field is skipped when the record is projected onto a
//! table row, a present field is written as-is (after coercion).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Recognized record fields, in table column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    ScheduleId,
    RuleId,
    RuleName,
    CouponType,
    WebDescription,
    AppDescription,
    WebTerms,
    AppTerms,
    UrlKey,
    ShowOnWeb,
    ShowOnApp,
    StartDate,
    EndDate,
    Status,
}

impl RecordField {
    /// All recognized fields in declared order
    pub const ALL: [RecordField; 14] = [
        RecordField::ScheduleId,
        RecordField::RuleId,
        RecordField::RuleName,
        RecordField::CouponType,
        RecordField::WebDescription,
        RecordField::AppDescription,
        RecordField::WebTerms,
        RecordField::AppTerms,
        RecordField::UrlKey,
        RecordField::ShowOnWeb,
        RecordField::ShowOnApp,
        RecordField::StartDate,
        RecordField::EndDate,
        RecordField::Status,
    ];

    /// Number of recognized fields (full row arity)
    pub const COUNT: usize = Self::ALL.len();

    /// Column / wire name of the field
    pub const fn name(&self) -> &'static str {
        match self {
            RecordField::ScheduleId => "schedule_id",
            RecordField::RuleId => "rule_id",
            RecordField::RuleName => "rule_name",
            RecordField::CouponType => "coupon_type",
            RecordField::WebDescription => "web_description",
            RecordField::AppDescription => "app_description",
            RecordField::WebTerms => "web_terms",
            RecordField::AppTerms => "app_terms",
            RecordField::UrlKey => "url_key",
            RecordField::ShowOnWeb => "show_on_web",
            RecordField::ShowOnApp => "show_on_app",
            RecordField::StartDate => "start_date",
            RecordField::EndDate => "end_date",
            RecordField::Status => "status",
        }
    }

    /// Whether the field may hold a JSON-encoded `{storeCode: text}` map
    pub const fn is_localized(&self) -> bool {
        matches!(
            self,
            RecordField::WebDescription
                | RecordField::AppDescription
                | RecordField::WebTerms
                | RecordField::AppTerms
        )
    }

    /// Look up a field by its column name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sales rule record (promotion schedule)
///
/// `schedule_id` is the business key, unique per table. Values keep their
/// inbound JSON type (string, number or boolean).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_type: Option<Value>,
    /// Localized: plain text or `{"US": "...", "AE": "..."}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_description: Option<Value>,
    /// Localized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_description: Option<Value>,
    /// Localized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_terms: Option<Value>,
    /// Localized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_terms: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_key: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_on_web: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_on_app: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Value>,
    /// Boolean-like: `true`, `1`, `"yes"`, `"on"` ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

impl SalesRule {
    /// Value of a field, `None` when absent
    pub fn get(&self, field: RecordField) -> Option<&Value> {
        match field {
            RecordField::ScheduleId => self.schedule_id.as_ref(),
            RecordField::RuleId => self.rule_id.as_ref(),
            RecordField::RuleName => self.rule_name.as_ref(),
            RecordField::CouponType => self.coupon_type.as_ref(),
            RecordField::WebDescription => self.web_description.as_ref(),
            RecordField::AppDescription => self.app_description.as_ref(),
            RecordField::WebTerms => self.web_terms.as_ref(),
            RecordField::AppTerms => self.app_terms.as_ref(),
            RecordField::UrlKey => self.url_key.as_ref(),
            RecordField::ShowOnWeb => self.show_on_web.as_ref(),
            RecordField::ShowOnApp => self.show_on_app.as_ref(),
            RecordField::StartDate => self.start_date.as_ref(),
            RecordField::EndDate => self.end_date.as_ref(),
            RecordField::Status => self.status.as_ref(),
        }
    }

    /// Set or clear a field
    pub fn set(&mut self, field: RecordField, value: Option<Value>) {
        let slot = match field {
            RecordField::ScheduleId => &mut self.schedule_id,
            RecordField::RuleId => &mut self.rule_id,
            RecordField::RuleName => &mut self.rule_name,
            RecordField::CouponType => &mut self.coupon_type,
            RecordField::WebDescription => &mut self.web_description,
            RecordField::AppDescription => &mut self.app_description,
            RecordField::WebTerms => &mut self.web_terms,
            RecordField::AppTerms => &mut self.app_terms,
            RecordField::UrlKey => &mut self.url_key,
            RecordField::ShowOnWeb => &mut self.show_on_web,
            RecordField::ShowOnApp => &mut self.show_on_app,
            RecordField::StartDate => &mut self.start_date,
            RecordField::EndDate => &mut self.end_date,
            RecordField::Status => &mut self.status,
        };
        *slot = value;
    }

    /// Builder-style setter
    pub fn with(mut self, field: RecordField, value: impl Into<Value>) -> Self {
        self.set(field, Some(value.into()));
        self
    }

    /// Number of fields present on the record
    pub fn present_count(&self) -> usize {
        RecordField::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .count()
    }
}
