//! Convenience result type alias for Coreplus.

use crate::error::AppError;

/// A specialized `Result` type for Coreplus operations.
pub type AppResult<T> = Result<T, AppError>;
