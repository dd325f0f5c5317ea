//! Error types for rulebook storage and analysis payloads.

use thiserror::Error;

/// A draft rule that cannot be accepted into the rulebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleValidationError {
    #[error("rule title must not be empty")]
    EmptyTitle,
    #[error("rule description must not be empty")]
    EmptyDescription,
}

/// Failures reading or writing the persisted rulebook.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid rule: {0}")]
    Invalid(#[from] RuleValidationError),

    #[error("rulebook I/O at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("rulebook encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The backend refused the write for a reason of its own.
    #[error("rulebook backend: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// An analysis payload that does not match the expected shape.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no JSON object found in analysis output")]
    NoPayload,

    /// The payload parsed as JSON but broke the contract, e.g. an unknown risk level.
    #[error("analysis payload violates contract: {0}")]
    Contract(String),
}

/// Writing to the platform clipboard failed.
#[derive(Debug, Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_field() {
        assert_eq!(
            RuleValidationError::EmptyTitle.to_string(),
            "rule title must not be empty"
        );
        let err: StoreError = RuleValidationError::EmptyDescription.into();
        assert_eq!(
            err.to_string(),
            "invalid rule: rule description must not be empty"
        );
    }

    #[test]
    fn io_error_carries_path() {
        let err = StoreError::io(
            std::path::Path::new("/tmp/rules.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "rulebook I/O at /tmp/rules.json: denied");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
        assert_send_sync::<AnalysisError>();
        assert_send_sync::<ClipboardError>();
    }
}
