//! Sync engine error types

use rulesheet_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory entry a configuration error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Brand,
    Store,
}

/// Remote resource a resolution step failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Site,
    File,
    Worksheet,
    Table,
    Row,
}

/// Sync engine error type
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required input missing before any remote call (brand, store, file path)
    #[error("Configuration error: {1}")]
    Configuration(Setting, String),

    /// A resolution step found no matching remote resource
    #[error("Not found: {1}")]
    NotFound(Resource, String),

    /// Named column missing or field-count precondition failed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Downloaded workbook could not be read or written back
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Remote resource locked by another writer
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The event's time budget ran out before this site finished
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Any other remote or network failure
    #[error("Transport error: {0}")]
    Transport(#[source] ClientError),
}

/// Stable error classification carried in per-site reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BrandNotConfigured,
    StoreNotConfigured,
    SiteNotFound,
    FileNotFound,
    WorksheetNotFound,
    TableNotFound,
    RowNotFound,
    Schema,
    Workbook,
    Conflict,
    Timeout,
    Unauthorized,
    Network,
    Transport,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Configuration(Setting::Brand, _) => ErrorKind::BrandNotConfigured,
            SyncError::Configuration(Setting::Store, _) => ErrorKind::StoreNotConfigured,
            SyncError::NotFound(Resource::Site, _) => ErrorKind::SiteNotFound,
            SyncError::NotFound(Resource::File, _) => ErrorKind::FileNotFound,
            SyncError::NotFound(Resource::Worksheet, _) => ErrorKind::WorksheetNotFound,
            SyncError::NotFound(Resource::Table, _) => ErrorKind::TableNotFound,
            SyncError::NotFound(Resource::Row, _) => ErrorKind::RowNotFound,
            SyncError::Schema(_) => ErrorKind::Schema,
            SyncError::Workbook(_) => ErrorKind::Workbook,
            SyncError::Conflict(_) => ErrorKind::Conflict,
            SyncError::Timeout(_) => ErrorKind::Timeout,
            SyncError::Transport(err) => match err {
                ClientError::Unauthorized(_) | ClientError::Auth(_) => ErrorKind::Unauthorized,
                ClientError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
                ClientError::Http(e) if e.is_connect() => ErrorKind::Network,
                _ => ErrorKind::Transport,
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(..))
    }
}

impl From<ClientError> for SyncError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Locked(message) => SyncError::Conflict(message),
            other if other.is_locked() => SyncError::Conflict(other.to_string()),
            other => SyncError::Transport(other),
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_signal_maps_to_conflict() {
        let err: SyncError = ClientError::Locked("workbook is locked".into()).into();
        assert!(matches!(err, SyncError::Conflict(_)));

        let err: SyncError = ClientError::Api {
            status: 409,
            code: "conflict".into(),
            message: "File is Locked for editing".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_other_client_errors_are_transport() {
        let err: SyncError = ClientError::NotFound("gone".into()).into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!err.is_not_found());

        let err: SyncError = ClientError::Unauthorized("expired".into()).into();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_kind_follows_failing_step() {
        let err = SyncError::Configuration(Setting::Store, "store ZZ".into());
        assert_eq!(err.kind(), ErrorKind::StoreNotConfigured);
        assert_eq!(err.to_string(), "Configuration error: store ZZ");

        let err = SyncError::NotFound(Resource::Worksheet, "visible worksheet".into());
        assert_eq!(err.kind(), ErrorKind::WorksheetNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::StoreNotConfigured).unwrap();
        assert_eq!(json, "\"store_not_configured\"");
    }
}
