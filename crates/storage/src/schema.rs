//! Idempotent container (table) lifecycle.

use granary_core::{validate_container_name, Error, Result};
use tracing::warn;

use crate::connection::ConnectionManager;

/// Ensure a container exists with the fixed row shape. Idempotent and safe
/// under concurrent creators (`CREATE TABLE IF NOT EXISTS`).
pub fn ensure_container(conn: &ConnectionManager, container: &str) -> Result<()> {
    validate_container_name(container)?;
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {container} \
         (kid INTEGER PRIMARY KEY, tunix INTEGER, notes TEXT, pzblob BLOB)"
    );
    conn.execute_one(&sql)
}

/// Drop a container and all its rows. Dropping an absent container is not
/// an error in the public contract; failures are logged and reported as
/// `Error::SchemaDropFailed` for the caller to decide whether to ignore.
pub fn drop_container(conn: &ConnectionManager, container: &str) -> Result<()> {
    validate_container_name(container)?;
    let sql = format!("DROP TABLE IF EXISTS {container}");
    conn.execute_one(&sql).map_err(|e| {
        warn!(container, error = %e, "drop_container failed");
        match e {
            Error::IoFailure { source, .. } => Error::SchemaDropFailed {
                container: container.to_string(),
                source,
            },
            other => other,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::TransactionBehavior;
    use std::time::Duration;

    fn manager() -> (tempfile::TempDir, ConnectionManager) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let mgr = ConnectionManager::new(path, Duration::from_secs(5), TransactionBehavior::Immediate);
        (dir, mgr)
    }

    #[test]
    fn ensure_container_is_idempotent() {
        let (_dir, mgr) = manager();
        ensure_container(&mgr, "goldfinger").unwrap();
        ensure_container(&mgr, "goldfinger").unwrap();
    }

    #[test]
    fn drop_absent_container_is_not_an_error() {
        let (_dir, mgr) = manager();
        assert!(drop_container(&mgr, "never_created").is_ok());
    }

    #[test]
    fn rejects_invalid_container_names() {
        let (_dir, mgr) = manager();
        assert!(ensure_container(&mgr, "bad name").is_err());
    }
}
