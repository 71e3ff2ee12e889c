//! Whole-file rewrite
//!
//! Downloads the workbook, edits it as a parsed [`WorkbookFile`] and uploads
//! the result. In [`WriteMode::File`] a locked upload is retried in the
//! background and the caller gets the handle; in [`WriteMode::FileReplace`]
//! a locked file is deleted and written again by path, once.

use std::sync::Arc;

use rulesheet_client::ItemRef;
use serde_json::Value;
use shared::SalesRule;

use crate::engine::{SyncEngine, WriteMode};
use crate::error::SyncResult;
use crate::executor::UpsertOutcome;
use crate::retry::{RetryHandle, spawn_locked_write};
use crate::session::SessionContext;
use crate::workbook::WorkbookFile;

/// Result of a whole-file edit
#[derive(Debug)]
pub struct FileWrite<T> {
    pub result: T,
    /// Upload still retrying in the background; `None` when nothing is pending
    pub upload: Option<RetryHandle>,
}

impl SyncEngine {
    /// Whole-file counterpart of [`SyncEngine::upsert`]
    pub async fn upsert_in_file(
        &self,
        session: &mut SessionContext,
        record: &SalesRule,
    ) -> SyncResult<FileWrite<UpsertOutcome>> {
        let (values, _) = self.mapped_row(record, session.target().locale())?;
        self.edit_file(session, |file| Ok((file.upsert(&values)?, true)))
            .await
    }

    /// Whole-file counterpart of [`SyncEngine::deactivate`]
    pub async fn deactivate_in_file(
        &self,
        session: &mut SessionContext,
        schedule_id: &Value,
    ) -> SyncResult<FileWrite<usize>> {
        self.edit_file(session, |file| Ok((file.deactivate(schedule_id)?, true)))
            .await
    }

    /// Whole-file counterpart of [`SyncEngine::delete`]; an absent row
    /// uploads nothing
    pub async fn delete_in_file(
        &self,
        session: &mut SessionContext,
        schedule_id: &Value,
    ) -> SyncResult<FileWrite<bool>> {
        self.edit_file(session, |file| {
            let deleted = file.delete(schedule_id)?;
            Ok((deleted, deleted))
        })
        .await
    }

    /// Download, edit and upload the session's file
    ///
    /// `edit` returns its result and whether the file changed. A failed edit
    /// uploads nothing.
    async fn edit_file<T, F>(
        &self,
        session: &mut SessionContext,
        edit: F,
    ) -> SyncResult<FileWrite<T>>
    where
        F: FnOnce(&mut WorkbookFile) -> SyncResult<(T, bool)>,
    {
        let item = self.resolve_item(session).await?;
        let content = self.api.download_content(&item).await?;
        let mut file = WorkbookFile::parse(&content)?;
        let (result, changed) = edit(&mut file)?;
        if !changed {
            return Ok(FileWrite { result, upload: None });
        }
        let content = file.to_bytes()?;

        let upload = match self.write_mode {
            WriteMode::FileReplace => {
                self.upload_replacing(session, &item, content).await?;
                None
            }
            WriteMode::Table | WriteMode::File => {
                Some(self.upload_in_background(item, content))
            }
        };
        Ok(FileWrite { result, upload })
    }

    /// Upload, retrying a locked write until the ceiling
    ///
    /// Returns at once; the handle reports how the upload ended. Engine
    /// shutdown cancels it.
    fn upload_in_background(&self, item: ItemRef, content: Vec<u8>) -> RetryHandle {
        let content = Arc::new(content);
        let label = format!("upload of item {}", item.item_id);
        self.log.debug(&format!("Scheduling {label} ({} bytes)", content.len()));

        let api = self.api.clone();
        spawn_locked_write(
            self.retry,
            self.shutdown.child_token(),
            self.log.clone(),
            label,
            move || {
                let api = api.clone();
                let item = item.clone();
                let content = content.clone();
                async move { api.upload_content(&item, content.to_vec()).await }
            },
        )
    }

    /// Upload; a locked file is deleted and written again by path, once
    ///
    /// The replacement file gets a new item id, so the session's memoized
    /// item is stale afterwards; start a new session for further work.
    async fn upload_replacing(
        &self,
        session: &mut SessionContext,
        item: &ItemRef,
        content: Vec<u8>,
    ) -> SyncResult<()> {
        match self.api.upload_content(item, content.clone()).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_locked() => {
                let path = self.resolve_file_path(session)?;
                self.log.info(&format!("{path} is locked, replacing the file"));
                self.api.delete_item(item).await?;
                self.api
                    .upload_by_path(&item.site_id, &path, content)
                    .await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
