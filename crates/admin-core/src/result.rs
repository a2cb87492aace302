//! Convenience result type alias for the admin backend.

use crate::error::AppError;

/// A specialized `Result` type for admin backend operations.
///
/// Every crate in the workspace returns this alias so that errors flow
/// through `?` without per-crate conversions.
pub type AppResult<T> = Result<T, AppError>;
