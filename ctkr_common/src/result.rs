//! Result type alias shared across the workspace.
//!
//! Defaults the error type to `CtkrError`, so functions can simply return `Result<T>`.
use crate::error::CtkrError;

/// Workspace-wide `Result` alias with `CtkrError` as the default error.
pub type Result<T, E = CtkrError> = std::result::Result<T, E>;
