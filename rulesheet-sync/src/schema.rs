//! Schema resolution: worksheet, table and header map of the addressed
//! workbook.

use rulesheet_client::TableRef;

use crate::engine::SyncEngine;
use crate::error::{Resource, SyncError, SyncResult};
use crate::session::{HeaderMap, SessionContext};

impl SyncEngine {
    /// Worksheet holding the table
    ///
    /// A worksheet pinned for the store in the site directory wins; otherwise
    /// the first visible worksheet is used.
    pub async fn resolve_worksheet_id(&self, session: &mut SessionContext) -> SyncResult<String> {
        if let Some(id) = &session.worksheet_id {
            return Ok(id.clone());
        }

        let pinned = self
            .directory
            .store(session.store_code())
            .and_then(|location| location.worksheet_override())
            .map(str::to_string);

        let worksheet_id = match pinned {
            Some(id) => {
                self.log.debug(&format!(
                    "Using pinned worksheet {id} for store {}",
                    session.store_code()
                ));
                id
            }
            None => {
                let item = self.resolve_item(session).await?;
                self.api
                    .list_worksheets(&item)
                    .await?
                    .into_iter()
                    .find(|ws| ws.is_visible())
                    .map(|ws| ws.id)
                    .ok_or_else(|| {
                        SyncError::NotFound(
                            Resource::Worksheet,
                            format!("visible worksheet in item {}", item.item_id),
                        )
                    })?
            }
        };

        session.worksheet_id = Some(worksheet_id.clone());
        Ok(worksheet_id)
    }

    /// First table on the resolved worksheet
    pub async fn resolve_table_id(&self, session: &mut SessionContext) -> SyncResult<TableRef> {
        if let Some(table) = &session.table {
            return Ok(table.clone());
        }

        let item = self.resolve_item(session).await?;
        let worksheet_id = self.resolve_worksheet_id(session).await?;
        let table_id = self
            .api
            .list_tables(&item, &worksheet_id)
            .await?
            .into_iter()
            .next()
            .map(|t| t.id)
            .ok_or_else(|| {
                SyncError::NotFound(Resource::Table, format!("table on worksheet {worksheet_id}"))
            })?;

        self.log.debug(&format!("Resolved table {table_id} on worksheet {worksheet_id}"));
        let table = TableRef::new(item, table_id);
        session.table = Some(table.clone());
        Ok(table)
    }

    /// Column name → index map of the resolved table
    pub async fn resolve_header_map(&self, session: &mut SessionContext) -> SyncResult<HeaderMap> {
        if let Some(headers) = &session.header_map {
            return Ok(headers.clone());
        }

        let table = self.resolve_table_id(session).await?;
        let columns = self.api.list_columns(&table).await?;
        if columns.is_empty() {
            return Err(SyncError::NotFound(
                Resource::Table,
                format!("columns of table {}", table.table_id),
            ));
        }

        let headers = HeaderMap::from_columns(&columns);
        session.header_map = Some(headers.clone());
        Ok(headers)
    }
}
