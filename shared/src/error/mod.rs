//! Unified error system for the rulesheet workspace
//!
//! - [`ErrorCode`]: Standardized error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::RowNotFound, "schedule 42 is not in the table")
//!     .with_detail("site", "AE");
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(7004));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
