//! Error types for the keyspace layer.

use thiserror::Error;

/// Result type for keyspace operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in keyspace operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// `get` was called with a key absent from the keyspace.
    #[error("key not found in keyspace {keyspace}: {key:?}")]
    KeyNotFound {
        /// The keyspace that was searched.
        keyspace: String,
        /// The key that was not found.
        key: Vec<u8>,
    },

    /// `list` was called with no requested keys.
    #[error("empty key list")]
    EmptyKeyList,

    /// The named keyspace has been deleted or was never created.
    #[error("keyspace not found: {name}")]
    KeyspaceMissing {
        /// Name of the keyspace.
        name: String,
    },

    /// The database has been closed.
    #[error("database is closed")]
    DatabaseClosed,

    /// A failure surfaced verbatim from the storage engine.
    #[error("storage engine error: {0}")]
    Engine(#[from] redb::Error),
}

impl CoreError {
    /// Creates a key-not-found error.
    pub fn key_not_found(keyspace: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self::KeyNotFound {
            keyspace: keyspace.into(),
            key: key.into(),
        }
    }

    /// Creates a keyspace-missing error.
    pub fn keyspace_missing(name: impl Into<String>) -> Self {
        Self::KeyspaceMissing { name: name.into() }
    }

    /// Maps a table-open failure, turning a missing table into `KeyspaceMissing`.
    pub(crate) fn from_table_error(name: &str, err: redb::TableError) -> Self {
        match err {
            redb::TableError::TableDoesNotExist(_) => Self::keyspace_missing(name),
            other => Self::Engine(other.into()),
        }
    }
}

impl From<redb::DatabaseError> for CoreError {
    fn from(err: redb::DatabaseError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::TransactionError> for CoreError {
    fn from(err: redb::TransactionError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::StorageError> for CoreError {
    fn from(err: redb::StorageError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::CommitError> for CoreError {
    fn from(err: redb::CommitError) -> Self {
        Self::Engine(err.into())
    }
}
