//! Shared types for the rulesheet workspace
//!
//! Record model, site directory tables and the unified error/response
//! envelope used by the sync engine and the ingestion server.

pub mod error;
pub mod models;
pub mod site;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use models::{RecordField, SalesRule};
pub use site::{SiteDirectory, SiteRef, StoreLocation};
