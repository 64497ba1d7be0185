//! Unified error type for the warehouse.
//!
//! All fallible operations across `granary-codec`, `granary-storage`,
//! `granary-farm`, and `granary-api` return this `Error`, following the
//! teacher's convention of one crate-wide `thiserror` enum rather than a
//! per-module error type per call site.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Could not acquire a write lock within the configured busy timeout.
    #[error("busy: could not acquire write lock within timeout (sql: {sql})")]
    BusyTimeout { sql: String },

    /// Any other backend failure on open/execute/commit.
    #[error("io failure executing `{sql}`: {source}")]
    IoFailure {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// `drop_container` failed; callers treat this as non-fatal.
    #[error("failed to drop container `{container}`: {source}")]
    SchemaDropFailed {
        container: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The codec refused to decode a blob (unknown version tag or corrupt payload).
    #[error("refused to decode row {kid}: {reason}")]
    DecodeRefused { kid: i64, reason: String },

    /// The codec failed to encode a value for storage.
    #[error("failed to encode value: {0}")]
    EncodeFailed(String),

    /// Source and destination of a cross-file copy coincide.
    #[error("copy refused: source and destination are the same container in the same file")]
    IllegalCopy,

    /// The backend's primary key space is exhausted.
    #[error("kid overflow in container `{container}`")]
    IntegerOverflowOnKid { container: String },

    /// A container name doesn't match the restricted identifier shape.
    #[error("invalid container name `{0}`: must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidContainerName(String),

    /// A `StoreConfig`/`FarmConfig` failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Wrapped I/O error not otherwise classified (e.g. reading a file to insert).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_busy(&self) -> bool {
        matches!(self, Error::BusyTimeout { .. })
    }

    pub fn is_retryable(&self) -> bool {
        self.is_busy()
    }

    /// Classify a `rusqlite::Error` from an execute/commit path, attaching
    /// the offending SQL template for diagnostics.
    pub fn from_rusqlite(err: rusqlite::Error, sql: impl Into<String>) -> Self {
        let sql = sql.into();
        if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = err {
            if sqlite_err.code == rusqlite::ErrorCode::DatabaseBusy {
                return Error::BusyTimeout { sql };
            }
        }
        Error::IoFailure { sql, source: err }
    }
}
