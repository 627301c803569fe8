//! Error types for dbdiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbDiffError>;

#[derive(Error, Debug)]
pub enum DbDiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Error connecting to database {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Error retrieving schema: {message}")]
    Introspection { message: String },

    #[error("Error retrieving schema for table {table}: {message}")]
    TableIntrospection { table: String, message: String },

    #[error("No foreign key or single-column primary key to order the rows of table {table}")]
    NoSortableKey { table: String },

    #[error("'{}' is not a db3 file", path.display())]
    InvalidExtension { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl DbDiffError {
    pub fn introspection(msg: impl Into<String>) -> Self {
        Self::Introspection {
            message: msg.into(),
        }
    }

    pub fn table_introspection(table: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TableIntrospection {
            table: table.into(),
            message: msg.into(),
        }
    }

    pub fn no_sortable_key(table: impl Into<String>) -> Self {
        Self::NoSortableKey {
            table: table.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
