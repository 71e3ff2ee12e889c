//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::SiteNotFound
            | Self::FileNotFound
            | Self::TableNotFound
            | Self::WorksheetNotFound
            | Self::RowNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::ResourceLocked => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 400 Bad Request
            Self::ValidationFailed | Self::RequiredField => StatusCode::BAD_REQUEST,

            // 422 Unprocessable Entity
            Self::SiteNotConfigured
            | Self::StoreNotConfigured
            | Self::SchemaMismatch
            | Self::WorkbookUnreadable => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 / 504 upstream
            Self::NetworkError | Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,

            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
