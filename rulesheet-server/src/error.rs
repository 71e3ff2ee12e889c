//! Engine errors as API error codes

use rulesheet_sync::ErrorKind;
use shared::ErrorCode;

/// Error code reported for a failed site
pub fn code_for_kind(kind: ErrorKind) -> ErrorCode {
    match kind {
        ErrorKind::BrandNotConfigured => ErrorCode::SiteNotConfigured,
        ErrorKind::StoreNotConfigured => ErrorCode::StoreNotConfigured,
        ErrorKind::SiteNotFound => ErrorCode::SiteNotFound,
        ErrorKind::FileNotFound => ErrorCode::FileNotFound,
        ErrorKind::WorksheetNotFound => ErrorCode::WorksheetNotFound,
        ErrorKind::TableNotFound => ErrorCode::TableNotFound,
        ErrorKind::RowNotFound => ErrorCode::RowNotFound,
        ErrorKind::Schema => ErrorCode::SchemaMismatch,
        ErrorKind::Workbook => ErrorCode::WorkbookUnreadable,
        ErrorKind::Conflict => ErrorCode::ResourceLocked,
        ErrorKind::Timeout => ErrorCode::TimeoutError,
        ErrorKind::Unauthorized => ErrorCode::NotAuthenticated,
        ErrorKind::Network => ErrorCode::NetworkError,
        ErrorKind::Transport => ErrorCode::UpstreamError,
    }
}
