//! Domain models shared by the sync engine and the ingestion server

pub mod sales_rule;

pub use sales_rule::{RecordField, SalesRule};
