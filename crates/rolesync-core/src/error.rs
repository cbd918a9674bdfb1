use thiserror::Error;

/// Core error types for RoleSync object handling
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid object: {message}")]
    InvalidObject { message: String },

    #[error("Kind mismatch: expected {expected}, found {actual}")]
    KindMismatch { expected: String, actual: String },
}

impl CoreError {
    /// Create a new InvalidObject error
    pub fn invalid_object(message: impl Into<String>) -> Self {
        Self::InvalidObject {
            message: message.into(),
        }
    }

    /// Create a new KindMismatch error
    pub fn kind_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::KindMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_object("metadata must be an object");
        assert_eq!(err.to_string(), "Invalid object: metadata must be an object");

        let err = CoreError::kind_mismatch("ClusterRole", "ProviderRevision");
        assert_eq!(
            err.to_string(),
            "Kind mismatch: expected ClusterRole, found ProviderRevision"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::JsonError(_)));
    }
}
