//! Error types for the form flow library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all form flow operations.
#[derive(Error, Debug)]
pub enum FlowError {
    /// No stored state exists for the instance id. Handled internally by
    /// starting a fresh flow instance.
    #[error("Form flow instance not found in storage: instanceId={instance_id}")]
    FlowInstanceNotFound { instance_id: String },
    /// The flow instance is finished and cannot be modified anymore
    #[error("Form flow '{flow_name}' instance '{instance_id}' is already finished: {message}")]
    AlreadyFinished {
        flow_name: String,
        instance_id: String,
        message: String,
    },
    /// The current step index does not point at a configured step
    #[error("Step not found at index {index} in form flow '{flow_name}'")]
    StepNotFound { flow_name: String, index: usize },
    /// No step of the flow can be entered
    #[error("Navigation error: {message}")]
    Navigation { message: String },
    /// No flow is registered under the requested name
    #[error("Form flow does not exist: {name}")]
    FlowNotFound { name: String },
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors of flow data
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> FlowError {
        FlowError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> FlowError {
        FlowError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl FlowError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates an already-finished error for the given flow instance.
    pub fn already_finished(
        flow_name: impl Into<String>,
        instance_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        FlowError::AlreadyFinished {
            flow_name: flow_name.into(),
            instance_id: instance_id.into(),
            message: message.into(),
        }
    }

    /// Returns true for the storage miss that is recovered by starting over.
    pub fn is_instance_not_found(&self) -> bool {
        matches!(self, FlowError::FlowInstanceNotFound { .. })
    }

    /// Returns true if the flow instance was already finished.
    pub fn is_already_finished(&self) -> bool {
        matches!(self, FlowError::AlreadyFinished { .. })
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| FlowError::database(message).with_source(e))
    }
}

/// Result type alias for form flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_context_keeps_source() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to load").unwrap_err();

        assert_eq!(err.to_string(), "Database error: Failed to load");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_predicates() {
        let miss = FlowError::FlowInstanceNotFound {
            instance_id: "abc".to_string(),
        };
        assert!(miss.is_instance_not_found());
        assert!(!miss.is_already_finished());

        let finished = FlowError::already_finished("signup", "abc", "done");
        assert!(finished.is_already_finished());
        assert_eq!(
            finished.to_string(),
            "Form flow 'signup' instance 'abc' is already finished: done"
        );
    }

    #[test]
    fn test_invalid_input_builder() {
        let err = FlowError::invalid_input("state").with_reason("unknown tag");
        assert_eq!(err.to_string(), "Invalid input for field 'state': unknown tag");
    }
}
