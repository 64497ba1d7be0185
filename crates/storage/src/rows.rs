//! Row store: insert, delete, and the small scalar accessors (`max_kid`,
//! `max_tunix`) the query surface builds on.

use granary_core::{Error, Result};
use rusqlite::types::Value as SqlParam;
use tracing::debug;

use crate::connection::{ConnectionManager, ParamRow};
use crate::schema::ensure_container;

pub struct RowStore<'a> {
    conn: &'a ConnectionManager,
}

impl<'a> RowStore<'a> {
    pub fn new(conn: &'a ConnectionManager) -> Self {
        RowStore { conn }
    }

    /// Insert a fully materialized batch of `(notes, encoded bytes)` pairs,
    /// all inside one transaction. Rolls back entirely on any failure.
    pub fn insert_batch(&self, container: &str, pairs: Vec<(String, Vec<u8>)>) -> Result<()> {
        self.insert_stream(container, pairs.into_iter())
    }

    /// Same contract as [`insert_batch`](Self::insert_batch), but consumes a
    /// lazy iterator so the full batch never needs to live in memory at
    /// once.
    pub fn insert_stream(
        &self,
        container: &str,
        pairs: impl Iterator<Item = (String, Vec<u8>)>,
    ) -> Result<()> {
        ensure_container(self.conn, container)?;
        let sql = format!("INSERT INTO {container} VALUES (null, strftime('%s','now'), ?, ?)");
        let param_rows = pairs.map(|(notes, blob)| -> ParamRow {
            vec![SqlParam::Text(notes), SqlParam::Blob(blob)]
        });
        self.conn.execute_many(&sql, param_rows)
    }

    /// Delete every row matching `predicate_sql` (a `WHERE ...` fragment).
    /// Silently a no-op if nothing matches.
    pub fn delete_predicate(&self, container: &str, predicate_sql: &str, parameters: ParamRow) -> Result<()> {
        granary_core::validate_container_name(container)?;
        let sql = format!("DELETE FROM {container} {predicate_sql}");
        self.conn.execute_many(&sql, std::iter::once(parameters))
    }

    /// Delete exactly the row with this `kid`, if it exists.
    pub fn delete_by_kid(&self, container: &str, kid: i64) -> Result<()> {
        self.delete_predicate(container, "WHERE kid = ?", vec![SqlParam::Integer(kid)])
    }

    /// Largest `kid` present, or 0 if the container is empty or absent.
    pub fn max_kid(&self, container: &str) -> Result<i64> {
        self.scalar_i64(container, "MAX(kid)")
    }

    /// Largest `tunix` present, or 0 if the container is empty or absent.
    pub fn max_tunix(&self, container: &str) -> Result<i64> {
        self.scalar_i64(container, "MAX(tunix)")
    }

    fn scalar_i64(&self, container: &str, expr: &str) -> Result<i64> {
        granary_core::validate_container_name(container)?;
        let sql = format!("SELECT {expr} FROM {container}");
        let rows: std::result::Result<Vec<Option<i64>>, Error> =
            self.conn.stream_select(&sql, &vec![], |r| r.get(0));
        match rows {
            Ok(rows) => Ok(rows.into_iter().next().flatten().unwrap_or(0)),
            // The container doesn't exist yet: an empty store reports 0,
            // matching the source's `lastkid`/`lastsec` behavior.
            Err(_) => Ok(0),
        }
    }

    /// Request whole-file compaction.
    pub fn vacuum(&self) -> Result<()> {
        debug!("running VACUUM");
        self.conn.execute_one("VACUUM")
    }
}
