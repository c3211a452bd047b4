//! Error types for the merge library.

use thiserror::Error;

/// Main error type for merge operations.
#[derive(Error, Debug)]
pub enum MergeError {
    /// Configuration error (invalid YAML, missing fields, unknown table).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection pool error with context.
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Query execution error with context.
    #[error("Query error: {message}\n  Context: {context}")]
    Query { message: String, context: String },

    /// Copy failed for a specific table.
    #[error("Copy failed for table {table}: {message}")]
    Copy { table: String, message: String },

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MergeError {
    /// Create a Pool error with context about where it occurred.
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MergeError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Query error with context about where it occurred.
    pub fn query(message: impl ToString, context: impl Into<String>) -> Self {
        MergeError::Query {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Copy error.
    pub fn copy(table: impl Into<String>, message: impl Into<String>) -> Self {
        MergeError::Copy {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for merge operations.
pub type Result<T> = std::result::Result<T, MergeError>;
