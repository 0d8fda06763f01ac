//! Error taxonomy for the strand system

use thiserror::Error;

/// Core error type used throughout the strand system
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StrandError {
    #[error("history index {index} out of range (length {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("analysis engine error: {0}")]
    Analysis(String),

    #[error("project initialization failed: {0}")]
    ProjectInitialization(String),

    #[error("path resolution failed: {0}")]
    PathResolution(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl StrandError {
    /// Create a new analysis engine error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Create a new project initialization error
    pub fn project_initialization(message: impl Into<String>) -> Self {
        Self::ProjectInitialization(message.into())
    }

    /// Create a new path resolution error
    pub fn path_resolution(message: impl Into<String>) -> Self {
        Self::PathResolution(message.into())
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a new invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error category for structured logging and alerting
    pub fn category(&self) -> &'static str {
        match self {
            StrandError::InvalidIndex { .. } => "invalid_index",
            StrandError::Analysis(_) => "analysis_error",
            StrandError::ProjectInitialization(_) => "project_initialization_error",
            StrandError::PathResolution(_) => "path_resolution_error",
            StrandError::NotFound(_) => "not_found",
            StrandError::InvalidRequest(_) => "invalid_request",
            StrandError::Io(_) => "io_error",
            StrandError::Serialization(_) => "serialization_error",
            StrandError::Internal(_) => "internal_error",
        }
    }

    /// Check if this is a client error (4xx-style)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StrandError::InvalidIndex { .. }
                | StrandError::PathResolution(_)
                | StrandError::NotFound(_)
                | StrandError::InvalidRequest(_)
                | StrandError::Analysis(_)
        )
    }

    /// Check if this is a server error (5xx-style)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

/// Result type alias for strand operations
pub type StrandResult<T> = Result<T, StrandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_index_carries_bounds() {
        let err = StrandError::InvalidIndex { index: 3, len: 2 };
        assert_eq!(err.to_string(), "history index 3 out of range (length 2)");
        assert_eq!(err.category(), "invalid_index");
        assert!(err.is_client_error());
    }

    #[test]
    fn io_errors_are_server_errors() {
        let err = StrandError::from(std::io::Error::other("disk on fire"));
        assert_eq!(err.category(), "io_error");
        assert!(err.is_server_error());
    }
}
