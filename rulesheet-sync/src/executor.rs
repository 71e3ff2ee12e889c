//! Upsert / deactivate / delete executor
//!
//! Every table write runs through the lock retry loop and is awaited, so a
//! returned `Ok` means the remote store acknowledged the write.

use std::future::Future;

use rulesheet_client::ClientResult;
use serde::Serialize;
use serde_json::{Value, json};
use shared::{RecordField, SalesRule};
use tokio::time::Instant;

use crate::engine::SyncEngine;
use crate::error::{Resource, SyncError, SyncResult};
use crate::retry::retry_locked_write;
use crate::session::SessionContext;

/// Which write an upsert issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated { row: usize },
}

impl SyncEngine {
    /// Create the record's row, or overwrite it if `schedule_id` already exists
    ///
    /// The record must carry every recognized field; anything else is
    /// rejected before the first remote call.
    pub async fn upsert(
        &self,
        session: &mut SessionContext,
        record: &SalesRule,
    ) -> SyncResult<UpsertOutcome> {
        let (values, key) = self.mapped_row(record, session.target().locale())?;

        let row = self
            .find_row_index(session, RecordField::ScheduleId.name(), key)
            .await?;
        let table = self.resolve_table_id(session).await?;
        let deadline = session.deadline();
        let api = &self.api;

        match row {
            Some(row) => {
                self.write_table(deadline, &format!("update row {row}"), || {
                    api.update_row(&table, row, &values)
                })
                .await?;
                self.log.info(&format!("Updated schedule {key} at row {row}"));
                Ok(UpsertOutcome::Updated { row })
            }
            None => {
                self.write_table(deadline, "append row", || api.add_row(&table, &values))
                    .await?;
                self.log.info(&format!("Created schedule {key}"));
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Set `status` to 0 on the row of `schedule_id`, keeping every other cell
    ///
    /// Returns the row index. An absent row is `SyncError::NotFound`.
    pub async fn deactivate(
        &self,
        session: &mut SessionContext,
        schedule_id: &Value,
    ) -> SyncResult<usize> {
        let headers = self.resolve_header_map(session).await?;
        let status = headers
            .get(RecordField::Status.name())
            .ok_or_else(|| SyncError::Schema("status column not in table".into()))?;

        let row = self
            .find_row_index(session, RecordField::ScheduleId.name(), schedule_id)
            .await?
            .ok_or_else(|| {
                SyncError::NotFound(Resource::Row, format!("row for schedule {schedule_id}"))
            })?;

        let table = self.resolve_table_id(session).await?;
        let mut values = self.api.row_values(&table, row).await?;
        let cell = values.get_mut(status).ok_or_else(|| {
            SyncError::Schema(format!("row {row} has no cell for status column {status}"))
        })?;
        *cell = json!(0);

        let api = &self.api;
        self.write_table(session.deadline(), &format!("deactivate row {row}"), || {
            api.update_row(&table, row, &values)
        })
        .await?;
        self.log.info(&format!("Deactivated schedule {schedule_id} at row {row}"));
        Ok(row)
    }

    /// Remove the row of `schedule_id`
    ///
    /// `Ok(false)` when there was no such row.
    pub async fn delete(
        &self,
        session: &mut SessionContext,
        schedule_id: &Value,
    ) -> SyncResult<bool> {
        let Some(row) = self
            .find_row_index(session, RecordField::ScheduleId.name(), schedule_id)
            .await?
        else {
            self.log.info(&format!(
                "Schedule {schedule_id} already absent, nothing to delete"
            ));
            return Ok(false);
        };

        let table = self.resolve_table_id(session).await?;
        let api = &self.api;
        self.write_table(session.deadline(), &format!("delete row {row}"), || {
            api.delete_row(&table, row)
        })
        .await?;
        self.log.info(&format!("Deleted schedule {schedule_id} at row {row}"));
        Ok(true)
    }

    /// Mapped cells of a complete record plus its `schedule_id`
    pub(crate) fn mapped_row<'r>(
        &self,
        record: &'r SalesRule,
        locale: &str,
    ) -> SyncResult<(Vec<Value>, &'r Value)> {
        let values = self.map_record(record, locale);
        if values.len() != RecordField::COUNT {
            return Err(SyncError::Schema(format!(
                "record maps to {} values, table expects {}",
                values.len(),
                RecordField::COUNT
            )));
        }
        let key = record
            .get(RecordField::ScheduleId)
            .ok_or_else(|| SyncError::Schema("schedule_id is missing".into()))?;
        Ok((values, key))
    }

    /// Retried write, never past the session's deadline
    async fn write_table<F, Fut>(
        &self,
        deadline: Option<Instant>,
        what: &str,
        write: F,
    ) -> SyncResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<()>>,
    {
        let policy = match deadline {
            Some(deadline) => self.retry.until(deadline),
            None => self.retry,
        };
        let attempts = retry_locked_write(&policy, &self.shutdown, write)
            .await
            .into_result()?;
        if attempts > 1 {
            self.log.debug(&format!("{what} succeeded after {attempts} attempts"));
        }
        Ok(())
    }
}
