//! Event processing
//!
//! One inbound event carries a sales rule plus the sites it should be
//! active on and the sites it should be withdrawn from. Sites are processed
//! one at a time, deactivations first, each with its own session. A failed
//! site does not stop or roll back the others.
//!
//! With an event budget set, every site shares one deadline: lock retries
//! stop at it, and a site still unfinished when it passes is reported as
//! timed out, so the report always comes back within the budget.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::SalesRule;
use tokio::time::Instant;

use crate::engine::{DeactivationMode, SyncEngine, WriteMode};
use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::executor::UpsertOutcome;
use crate::session::{SessionContext, SiteTarget};

/// Inbound sales rule event
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesRuleEvent {
    pub rule: SalesRule,
    #[serde(default)]
    pub activate_on: Vec<SiteTarget>,
    #[serde(default)]
    pub deactivate_on: Vec<SiteTarget>,
}

impl SalesRuleEvent {
    pub fn target_count(&self) -> usize {
        self.activate_on.len() + self.deactivate_on.len()
    }
}

/// Operation applied to one site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteAction {
    Upsert,
    Deactivate,
    Delete,
}

/// Result for one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SiteStatus {
    Created,
    Updated { row: usize },
    Deactivated { row: usize },
    Deleted,
    /// Nothing to withdraw on this site
    Absent { message: String },
    Failed { kind: ErrorKind, message: String },
}

impl SiteStatus {
    fn failed(err: &SyncError) -> Self {
        SiteStatus::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    fn upserted(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Created => SiteStatus::Created,
            UpsertOutcome::Updated { row } => SiteStatus::Updated { row },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOutcome {
    pub target: SiteTarget,
    pub action: SiteAction,
    #[serde(flatten)]
    pub status: SiteStatus,
}

impl SiteOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, SiteStatus::Failed { .. })
    }

    /// Error kind of a failed site
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match &self.status {
            SiteStatus::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Per-site results of one event, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<Value>,
    pub sites: Vec<SiteOutcome>,
}

impl SyncReport {
    pub fn all_succeeded(&self) -> bool {
        !self.sites.iter().any(SiteOutcome::is_failure)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SiteOutcome> {
        self.sites.iter().filter(|s| s.is_failure())
    }
}

impl SyncEngine {
    /// Apply an event to every site it names
    pub async fn process_event(&self, event: &SalesRuleEvent) -> SyncReport {
        let deadline = self.event_budget.map(|budget| Instant::now() + budget);
        let schedule_id = event.rule.schedule_id.clone();
        let mut report = SyncReport {
            schedule_id: schedule_id.clone(),
            sites: Vec::with_capacity(event.target_count()),
        };

        let withdraw_action = match self.deactivation {
            DeactivationMode::SoftDelete => SiteAction::Deactivate,
            DeactivationMode::RemoveRow => SiteAction::Delete,
        };
        for target in &event.deactivate_on {
            let status = match schedule_id.as_ref() {
                None => SiteStatus::failed(&SyncError::Schema("schedule_id is missing".into())),
                Some(key) => {
                    let session = self.site_session(target, deadline);
                    self.within(deadline, self.withdraw(session, key)).await
                }
            };
            report.sites.push(self.site_outcome(target, withdraw_action, status));
        }

        for target in &event.activate_on {
            let session = self.site_session(target, deadline);
            let status = self.within(deadline, self.activate(session, &event.rule)).await;
            report.sites.push(self.site_outcome(target, SiteAction::Upsert, status));
        }

        report
    }

    fn site_session(&self, target: &SiteTarget, deadline: Option<Instant>) -> SessionContext {
        let session = self.session(target.clone());
        match deadline {
            Some(deadline) => session.with_deadline(deadline),
            None => session,
        }
    }

    /// Run one site's work, failing it as timed out past the deadline
    async fn within<F>(&self, deadline: Option<Instant>, work: F) -> SiteStatus
    where
        F: Future<Output = SiteStatus>,
    {
        let Some(deadline) = deadline else {
            return work.await;
        };
        let timed_out = || {
            SiteStatus::failed(&SyncError::Timeout(
                "event budget spent before the site finished".into(),
            ))
        };
        if Instant::now() >= deadline {
            return timed_out();
        }
        tokio::time::timeout_at(deadline, work)
            .await
            .unwrap_or_else(|_| timed_out())
    }

    async fn activate(&self, mut session: SessionContext, rule: &SalesRule) -> SiteStatus {
        let result = match self.write_mode {
            WriteMode::Table => self.upsert(&mut session, rule).await,
            WriteMode::File | WriteMode::FileReplace => self
                .upsert_in_file(&mut session, rule)
                .await
                .map(|write| write.result),
        };
        match result {
            Ok(outcome) => SiteStatus::upserted(outcome),
            Err(err) => SiteStatus::failed(&err),
        }
    }

    async fn withdraw(&self, mut session: SessionContext, key: &Value) -> SiteStatus {
        match self.withdraw_row(&mut session, key).await {
            Ok(status) => status,
            Err(SyncError::NotFound(_, message)) => SiteStatus::Absent { message },
            Err(err) => SiteStatus::failed(&err),
        }
    }

    async fn withdraw_row(
        &self,
        session: &mut SessionContext,
        key: &Value,
    ) -> SyncResult<SiteStatus> {
        let whole_file = self.write_mode != WriteMode::Table;
        match self.deactivation {
            DeactivationMode::SoftDelete => {
                let row = if whole_file {
                    self.deactivate_in_file(session, key).await?.result
                } else {
                    self.deactivate(session, key).await?
                };
                Ok(SiteStatus::Deactivated { row })
            }
            DeactivationMode::RemoveRow => {
                let deleted = if whole_file {
                    self.delete_in_file(session, key).await?.result
                } else {
                    self.delete(session, key).await?
                };
                Ok(if deleted {
                    SiteStatus::Deleted
                } else {
                    SiteStatus::Absent {
                        message: format!("row for schedule {key}"),
                    }
                })
            }
        }
    }

    fn site_outcome(
        &self,
        target: &SiteTarget,
        action: SiteAction,
        status: SiteStatus,
    ) -> SiteOutcome {
        let brand = target.brand.as_deref().unwrap_or("-");
        match &status {
            SiteStatus::Failed { message, .. } => self.log.info(&format!(
                "{action:?} on {brand}/{} failed: {message}",
                target.store_code
            )),
            other => self.log.debug(&format!(
                "{action:?} on {brand}/{}: {other:?}",
                target.store_code
            )),
        }
        SiteOutcome {
            target: target.clone(),
            action,
            status,
        }
    }
}
