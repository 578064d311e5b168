// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// A stored value could not be decoded.
    DecodeFailed {
        /// Table the value was read from.
        table: &'static str,
        /// Decoder message.
        reason: String,
    },
    /// A value could not be encoded for storage.
    EncodeFailed(String),
    /// A metric table is missing the unique index over its key.
    MissingUniqueIndex {
        /// The table without the index.
        table: &'static str,
    },
    /// The settings row is missing.
    SettingsMissing,
    /// Settings failed validation.
    InvalidSettings(String),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::DecodeFailed { table, reason } => {
                write!(f, "Failed to decode row from {table}: {reason}")
            }
            Self::EncodeFailed(msg) => write!(f, "Failed to encode value: {msg}"),
            Self::MissingUniqueIndex { table } => {
                write!(f, "Table {table} has no unique index over its key")
            }
            Self::SettingsMissing => write!(f, "Cache settings row is missing"),
            Self::InvalidSettings(msg) => write!(f, "Invalid settings: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
