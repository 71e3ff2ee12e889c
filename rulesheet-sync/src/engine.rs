//! Sync engine
//!
//! Holds the collaborators shared by every synchronization call: the remote
//! workbook API, the static site directory, the retry policy and the log
//! sink. All per-event state lives in [`SessionContext`], passed explicitly
//! to every operation.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use rulesheet_client::WorkbookApi;
use shared::SiteDirectory;
use tokio_util::sync::CancellationToken;

use crate::log::{NullLog, SyncLog};
use crate::retry::RetryPolicy;
use crate::session::{SessionContext, SiteTarget};

/// What "deactivate" means for a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeactivationMode {
    /// Keep the row, flip `status` to 0
    #[default]
    SoftDelete,
    /// Remove the row
    RemoveRow,
}

/// How a site's workbook is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Row calls against the workbook table, awaited
    #[default]
    Table,
    /// Download, edit and re-upload the file; a locked upload keeps
    /// retrying in the background
    File,
    /// Like `File`, but a locked file is deleted and written again once
    FileReplace,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(WriteMode::Table),
            "file" => Ok(WriteMode::File),
            "file-replace" => Ok(WriteMode::FileReplace),
            other => Err(format!("unknown write mode {other:?}")),
        }
    }
}

/// Remote table synchronization engine
#[derive(Clone)]
pub struct SyncEngine {
    pub(crate) api: Arc<dyn WorkbookApi>,
    pub(crate) directory: Arc<SiteDirectory>,
    pub(crate) log: Arc<dyn SyncLog>,
    pub(crate) retry: RetryPolicy,
    pub(crate) deactivation: DeactivationMode,
    pub(crate) write_mode: WriteMode,
    pub(crate) event_budget: Option<Duration>,
    pub(crate) shutdown: CancellationToken,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn WorkbookApi>, directory: Arc<SiteDirectory>) -> Self {
        Self {
            api,
            directory,
            log: Arc::new(NullLog),
            retry: RetryPolicy::default(),
            deactivation: DeactivationMode::default(),
            write_mode: WriteMode::default(),
            event_budget: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Set the log sink
    pub fn with_log(mut self, log: Arc<dyn SyncLog>) -> Self {
        self.log = log;
        self
    }

    /// Set the lock-conflict retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set how deactivations are applied
    pub fn with_deactivation_mode(mut self, mode: DeactivationMode) -> Self {
        self.deactivation = mode;
        self
    }

    /// Set how workbooks are written
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// Bound the time one event may spend across all of its sites
    ///
    /// Lock retries stop at the budget, and sites not started before it
    /// runs out are reported as timed out.
    pub fn with_event_budget(mut self, budget: Duration) -> Self {
        self.event_budget = Some(budget);
        self
    }

    /// Tie background retries to an external shutdown token
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Start a fresh session for one site
    pub fn session(&self, target: SiteTarget) -> SessionContext {
        SessionContext::new(target)
    }

    pub fn directory(&self) -> &SiteDirectory {
        &self.directory
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn event_budget(&self) -> Option<Duration> {
        self.event_budget
    }
}
