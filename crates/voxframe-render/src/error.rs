//! GPU boundary error types.

use thiserror::Error;

/// Errors reported across the GPU boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    /// Buffer allocation failed.
    #[error("Memory allocation failed: {0}")]
    AllocationFailed(String),

    /// Invalid state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GpuError>;
