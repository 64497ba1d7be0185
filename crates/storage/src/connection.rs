//! The connection manager: acquire a scoped handle to a file, run a
//! statement or batch under an immediate-write isolation, release it.
//!
//! Modeled on the original source's `Base.proceed`/`Base.respond` pair —
//! open, do exactly one thing, close on every exit path — but built on
//! `rusqlite` instead of hand-rolled connect/commit/close bookkeeping.

use std::path::{Path, PathBuf};
use std::time::Duration;

use granary_core::{Error, Result};
use rusqlite::types::Value as SqlParam;
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, warn};

/// One row of bound parameters for a parameterized statement.
pub type ParamRow = Vec<SqlParam>;

#[derive(Debug, Clone)]
pub struct ConnectionManager {
    path: PathBuf,
    busy_timeout: Duration,
    behavior: TransactionBehavior,
}

impl ConnectionManager {
    pub fn new(path: impl AsRef<Path>, busy_timeout: Duration, behavior: TransactionBehavior) -> Self {
        ConnectionManager {
            path: path.as_ref().to_path_buf(),
            busy_timeout,
            behavior,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(|e| Error::from_rusqlite(e, format!("open {}", self.path.display())))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| Error::from_rusqlite(e, "set busy_timeout".into()))?;
        Ok(conn)
    }

    /// Execute `sql` once per row in `param_rows`, inside one immediate-write
    /// transaction. Commits on success; rolls back (via drop) on any error.
    /// `param_rows` is consumed lazily so a streamed batch never needs to be
    /// materialized in memory.
    pub fn execute_many(
        &self,
        sql: &str,
        param_rows: impl Iterator<Item = ParamRow>,
    ) -> Result<()> {
        debug!(sql, "execute_many: opening connection");
        let mut conn = self.open()?;
        let txn = conn
            .transaction_with_behavior(self.behavior)
            .map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
        {
            let mut stmt = txn
                .prepare(sql)
                .map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
            let mut count = 0usize;
            for row in param_rows {
                let refs: Vec<&dyn rusqlite::ToSql> = row.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
                stmt.execute(refs.as_slice())
                    .map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
                count += 1;
            }
            debug!(sql, rows = count, "execute_many: statements applied");
        }
        txn.commit().map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
        Ok(())
    }

    /// Run a single parameterized read, materializing every matching row via
    /// `row_fn`. No commit is issued since this opens no write transaction.
    pub fn stream_select<T>(
        &self,
        sql: &str,
        params: &ParamRow,
        mut row_fn: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
        let refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();
        let rows = stmt
            .query_map(refs.as_slice(), |r| row_fn(r))
            .map_err(|e| Error::from_rusqlite(e, sql.to_string()))?;
        let mut out = Vec::new();
        for row in rows {
            match row {
                Ok(v) => out.push(v),
                Err(e) => {
                    warn!(sql, error = %e, "stream_select: row decode failed");
                    return Err(Error::from_rusqlite(e, sql.to_string()));
                }
            }
        }
        Ok(out)
    }

    /// Run a write statement with no return value outside of a batch
    /// transaction (used for `CREATE TABLE`, `DROP TABLE`, `VACUUM`).
    pub fn execute_one(&self, sql: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(sql, [])
            .map(|_| ())
            .map_err(|e| Error::from_rusqlite(e, sql.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, ConnectionManager) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let mgr = ConnectionManager::new(path, Duration::from_secs(5), TransactionBehavior::Immediate);
        (dir, mgr)
    }

    #[test]
    fn execute_many_commits_all_rows_in_one_transaction() {
        let (_dir, mgr) = manager();
        mgr.execute_one("CREATE TABLE t (kid INTEGER PRIMARY KEY, v TEXT)").unwrap();
        mgr.execute_many(
            "INSERT INTO t VALUES (null, ?)",
            vec![
                vec![SqlParam::Text("a".into())],
                vec![SqlParam::Text("b".into())],
            ]
            .into_iter(),
        )
        .unwrap();
        let rows: Vec<String> = mgr
            .stream_select("SELECT v FROM t ORDER BY kid", &vec![], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, vec!["a", "b"]);
    }

    #[test]
    fn execute_one_runs_ddl() {
        let (_dir, mgr) = manager();
        mgr.execute_one("CREATE TABLE IF NOT EXISTS t (kid INTEGER PRIMARY KEY)").unwrap();
        mgr.execute_one("CREATE TABLE IF NOT EXISTS t (kid INTEGER PRIMARY KEY)").unwrap();
    }
}
