//! Core error types for sis-core.
//!
//! This module defines the error hierarchy using thiserror. Missing data is
//! never an error here: an empty slot or an empty lookup result is a valid
//! answer. Errors are reserved for malformed input, ambiguous lookups and
//! failures of the storage layer.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sis-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed input records
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Name lookups that matched nothing or too much
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors for records handed to the core.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Value outside of its allowed range
    #[error("Value {value} for '{field}' is out of range {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A date that falls on Saturday or Sunday
    #[error("{0} is not a school day")]
    WeekendDate(chrono::NaiveDate),

    /// A substitution that belongs to another date than the requested table
    #[error("Substitution dated {found} does not belong to the table for {expected}")]
    DateMismatch {
        expected: chrono::NaiveDate,
        found: chrono::NaiveDate,
    },
}

/// Lookup errors raised by name-based resolution helpers.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    /// Nothing matched
    #[error("No {kind} matches '{query}'")]
    NotFound { kind: &'static str, query: String },

    /// More than one record matched
    #[error("{count} {kind}s match '{query}', please be more specific")]
    MultipleMatches {
        kind: &'static str,
        query: String,
        count: usize,
    },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
