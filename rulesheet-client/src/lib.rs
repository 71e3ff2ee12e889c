//! Rulesheet Client - REST client for the remote workbook store
//!
//! Addresses workbooks stored in a SharePoint document library through the
//! Graph workbook API (worksheets, tables, columns, rows) and exposes the
//! whole-file content endpoints used by the legacy rewrite path.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use api::WorkbookApi;
pub use auth::{ClientCredentials, StaticToken, TokenProvider};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use crate::http::GraphClient;
pub use types::{ColumnInfo, ItemRef, TableInfo, TableRef, Worksheet};
