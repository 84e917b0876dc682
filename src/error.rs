use thiserror::Error;

use crate::form::FieldErrors;
use crate::types::EntityKind;

#[derive(Error, Debug)]
pub enum BugHiveError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    Service(String),

    #[error("{kind} '{id}' was modified concurrently (expected version {expected}, found {actual})")]
    Conflict {
        kind: EntityKind,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid {field} '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BugHiveError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        BugHiveError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BugHiveError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BugHiveError::Conflict { .. })
    }

    /// Whether re-issuing the same call unchanged might succeed.
    ///
    /// Validation errors need edited input, and a missing record stays missing.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BugHiveError::Service(_) | BugHiveError::Http(_) | BugHiveError::Conflict { .. }
        )
    }

    /// Field-level messages, if this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            BugHiveError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BugHiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = BugHiveError::not_found(EntityKind::Ticket, "42");
        assert_eq!(err.to_string(), "ticket '42' not found");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = BugHiveError::Conflict {
            kind: EntityKind::TestCase,
            id: "7".to_string(),
            expected: 2,
            actual: 3,
        };
        assert!(err.is_conflict());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("expected version 2, found 3"));
    }

    #[test]
    fn test_validation_exposes_field_errors() {
        let mut errors = FieldErrors::default();
        errors.insert("title", "Title is required");
        let err = BugHiveError::Validation(errors);
        assert!(!err.is_retryable());
        assert_eq!(
            err.field_errors().and_then(|e| e.get("title")),
            Some("Title is required")
        );
    }
}
