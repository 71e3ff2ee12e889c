//! Sales rule synchronization engine
//!
//! Keeps promotion rows in remote workbook tables in step with inbound sales
//! rule events: resolves the workbook and table for a site, finds the row by
//! `schedule_id`, and creates, overwrites, deactivates or removes it.
//! Stores kept as plain xlsx files are edited whole and re-uploaded.
//!
//! All resolved identity and schema values live in a [`SessionContext`]
//! created per site and passed to every operation.

pub mod engine;
pub mod error;
pub mod event;
pub mod executor;
mod identity;
pub mod locator;
pub mod log;
pub mod mapper;
pub mod retry;
mod rewrite;
mod schema;
pub mod session;
pub mod workbook;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{DeactivationMode, SyncEngine, WriteMode};
pub use error::{ErrorKind, Resource, Setting, SyncError, SyncResult};
pub use event::{SalesRuleEvent, SiteAction, SiteOutcome, SiteStatus, SyncReport};
pub use executor::UpsertOutcome;
pub use log::{NullLog, SyncLog, TracingLog};
pub use mapper::{map_record, normalize_bool};
pub use retry::{RetryHandle, RetryOutcome, RetryPolicy};
pub use rewrite::FileWrite;
pub use session::{HeaderMap, SessionContext, SiteTarget};
pub use workbook::WorkbookFile;
