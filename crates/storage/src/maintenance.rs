//! Age-based retention and file compaction.

use granary_core::Result;
use rusqlite::types::Value as SqlParam;
use tracing::info;

use crate::connection::ConnectionManager;
use crate::rows::RowStore;

const SECONDS_PER_DAY: i64 = 86_400;

/// Delete every row older than `fresh_days` relative to the newest row in
/// `container` — not wall-clock time, so an idle container is never pruned.
/// `fresh_days = Some(0)` empties the container; `None` is a no-op.
pub fn prune(conn: &ConnectionManager, container: &str, fresh_days: Option<i64>) -> Result<()> {
    let Some(fresh_days) = fresh_days else {
        return Ok(());
    };
    let store = RowStore::new(conn);
    let newest = store.max_tunix(container)?;
    let cutoff = newest - fresh_days * SECONDS_PER_DAY;
    info!(container, fresh_days, cutoff, "pruning rows older than cutoff");
    store.delete_predicate(container, "WHERE tunix <= ?", vec![SqlParam::Integer(cutoff)])
}

/// Whole-file compaction.
pub fn compact(conn: &ConnectionManager) -> Result<()> {
    RowStore::new(conn).vacuum()
}

/// `prune` then `compact`.
pub fn clean(conn: &ConnectionManager, container: &str, fresh_days: Option<i64>) -> Result<()> {
    prune(conn, container, fresh_days)?;
    compact(conn)
}
