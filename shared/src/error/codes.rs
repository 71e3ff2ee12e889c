//! Unified error codes for the rulesheet workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Site / directory errors
//! - 7xxx: Remote table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they serialize compactly
/// into the `code` field of [`super::ApiResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,

    // ==================== 3xxx: Site ====================
    /// Brand has no site configured
    SiteNotConfigured = 3001,
    /// Site could not be resolved remotely
    SiteNotFound = 3002,
    /// Store code has no directory configured
    StoreNotConfigured = 3003,
    /// Workbook file could not be resolved remotely
    FileNotFound = 3004,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// No visible worksheet
    WorksheetNotFound = 7002,
    /// Row with the given key is absent
    RowNotFound = 7004,
    /// Column count or field count mismatch
    SchemaMismatch = 7005,
    /// Remote resource is locked by another writer
    ResourceLocked = 7006,
    /// Downloaded workbook file could not be read or written
    WorkbookUnreadable = 7007,

    // ==================== 9xxx: System ====================
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Remote service returned an unexpected response
    UpstreamError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "Not authenticated",

            // Site
            ErrorCode::SiteNotConfigured => "No site configured for brand",
            ErrorCode::SiteNotFound => "Site not found",
            ErrorCode::StoreNotConfigured => "No directory configured for store code",
            ErrorCode::FileNotFound => "Workbook file not found",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::WorksheetNotFound => "No visible worksheet found",
            ErrorCode::RowNotFound => "Row not found",
            ErrorCode::SchemaMismatch => "Table schema mismatch",
            ErrorCode::ResourceLocked => "Resource is locked by another writer",
            ErrorCode::WorkbookUnreadable => "Workbook file could not be processed",

            // System
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::UpstreamError => "Remote service error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Site
            3001 => Ok(ErrorCode::SiteNotConfigured),
            3002 => Ok(ErrorCode::SiteNotFound),
            3003 => Ok(ErrorCode::StoreNotConfigured),
            3004 => Ok(ErrorCode::FileNotFound),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::WorksheetNotFound),
            7004 => Ok(ErrorCode::RowNotFound),
            7005 => Ok(ErrorCode::SchemaMismatch),
            7006 => Ok(ErrorCode::ResourceLocked),
            7007 => Ok(ErrorCode::WorkbookUnreadable),

            // System
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9006 => Ok(ErrorCode::UpstreamError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
