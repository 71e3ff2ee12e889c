//! Identity resolution: brand → site id, store code → file path,
//! file path → drive item, and the full table address.

use rulesheet_client::{ItemRef, TableRef};
use shared::SiteRef;

use crate::engine::SyncEngine;
use crate::error::{Resource, Setting, SyncError, SyncResult};
use crate::session::SessionContext;

impl SyncEngine {
    /// Site id for the session's brand
    ///
    /// A brand configured with a direct site id needs no remote call.
    pub async fn resolve_site_id(&self, session: &mut SessionContext) -> SyncResult<String> {
        if let Some(site_id) = &session.site_id {
            return Ok(site_id.clone());
        }

        let brand = session
            .target()
            .brand
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                SyncError::Configuration(Setting::Brand, "brand is missing".into())
            })?;

        let site_id = match self.directory.site_for_brand(brand) {
            Some(SiteRef::Direct { site_id }) => site_id.clone(),
            Some(SiteRef::UrlKey(url_key)) => {
                self.log.debug(&format!("Resolving site for brand {brand} via {url_key}"));
                self.api
                    .site_id(url_key)
                    .await?
                    .ok_or_else(|| {
                        SyncError::NotFound(Resource::Site, format!("site {url_key}"))
                    })?
            }
            None => {
                return Err(SyncError::Configuration(
                    Setting::Brand,
                    format!("brand {brand} has no site configured"),
                ));
            }
        };

        session.site_id = Some(site_id.clone());
        Ok(site_id)
    }

    /// Drive-relative workbook path for the session's store code
    pub fn resolve_file_path(&self, session: &mut SessionContext) -> SyncResult<String> {
        if let Some(path) = &session.file_path {
            return Ok(path.clone());
        }

        let path = self
            .directory
            .file_path(session.store_code())
            .ok_or_else(|| {
                SyncError::Configuration(
                    Setting::Store,
                    format!("store {} has no directory configured", session.store_code()),
                )
            })?;

        session.file_path = Some(path.clone());
        Ok(path)
    }

    /// Drive item holding the session's workbook
    pub async fn resolve_item(&self, session: &mut SessionContext) -> SyncResult<ItemRef> {
        if let Some(item) = &session.item {
            return Ok(item.clone());
        }

        let path = self.resolve_file_path(session)?;
        let site_id = self.resolve_site_id(session).await?;
        let item_id = self
            .api
            .drive_item_id(&site_id, &path)
            .await?
            .ok_or_else(|| SyncError::NotFound(Resource::File, format!("file {path}")))?;

        self.log.debug(&format!("Resolved {path} to item {item_id}"));
        let item = ItemRef::new(site_id, item_id);
        session.item = Some(item.clone());
        Ok(item)
    }

    /// Full address of the session's table
    pub async fn resolve_table_address(
        &self,
        session: &mut SessionContext,
    ) -> SyncResult<TableRef> {
        self.resolve_table_id(session).await
    }
}
