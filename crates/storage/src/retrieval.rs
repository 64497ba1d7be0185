//! Latest / oldest / by-key / paged-last / pop-on-read operations, built as
//! pure compositions over the query surface and row store.

use granary_core::{Result, Value};

use crate::connection::ConnectionManager;
use crate::query::{Predicate, QuerySurface, ResultMap};
use crate::rows::RowStore;

/// Either a numeric offset or a comma-tag expression — the two shapes a
/// caller can pass to `select_latest`/`select_map`/`delete`.
#[derive(Debug, Clone)]
pub enum Dual {
    Offset(i64),
    Tags(String),
}

impl From<i64> for Dual {
    fn from(n: i64) -> Self {
        Dual::Offset(n)
    }
}
impl From<&str> for Dual {
    fn from(s: &str) -> Self {
        Dual::Tags(s.to_string())
    }
}
impl From<String> for Dual {
    fn from(s: String) -> Self {
        Dual::Tags(s)
    }
}

/// `selectdic`: dictionary of every row matching `dual`.
///
/// For the offset form this is "last m rows" (`kid > max_kid - m`); for the
/// tag form it's the usual comma-tag conjunction. When `pop` is set, every
/// row in the returned map is deleted.
pub fn select_map(conn: &ConnectionManager, dual: &Dual, container: &str, pop: bool) -> Result<ResultMap> {
    let store = RowStore::new(conn);
    let query = QuerySurface::new(conn);
    let predicate = match dual {
        Dual::Offset(m) => Predicate::last_n_plus_one(store.max_kid(container)?, *m),
        Dual::Tags(csvstr) => Predicate::from_comma_tags(csvstr, true),
    };
    query.select_map(container, &predicate, pop)
}

/// `select`: the single latest object matching `dual`.
///
/// For the tag form, many rows may match; only the row with the largest
/// `kid` among them is returned, and `pop` (if set) deletes only that one
/// row — not every row the tags matched. For the offset form the
/// predicate already targets a single row, so the two notions of "pop"
/// coincide.
pub fn select_latest(conn: &ConnectionManager, dual: &Dual, container: &str, pop: bool) -> Result<Option<Value>> {
    let query = QuerySurface::new(conn);
    match dual {
        Dual::Offset(n) => {
            let predicate = Predicate::nth_newest(container, *n);
            let map = query.select_map(container, &predicate, pop)?;
            Ok(map.into_values().next().map(|(_, _, v)| v))
        }
        Dual::Tags(csvstr) => {
            let predicate = Predicate::from_comma_tags(csvstr, true);
            let map = query.select_map(container, &predicate, false)?;
            match map.keys().max().copied() {
                Some(kid) => {
                    let (_, _, value) = map.get(&kid).cloned().unwrap();
                    if pop {
                        RowStore::new(conn).delete_by_kid(container, kid)?;
                    }
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }
}

/// `ominfirst`: the n-th oldest object (`n=0` is the very oldest).
pub fn select_oldest(conn: &ConnectionManager, n: i64, container: &str, pop: bool) -> Result<Option<Value>> {
    let query = QuerySurface::new(conn);
    let predicate = Predicate::nth_oldest(container, n);
    let map = query.select_map(container, &predicate, pop)?;
    Ok(map.into_values().next().map(|(_, _, v)| v))
}

/// Queue semantics: the oldest object, popped.
pub fn fifo(conn: &ConnectionManager, container: &str) -> Result<Option<Value>> {
    select_oldest(conn, 0, container, true)
}

/// A single row by primary key.
pub fn by_key(conn: &ConnectionManager, kid: i64, container: &str, pop: bool) -> Result<Option<Value>> {
    let query = QuerySurface::new(conn);
    let predicate = Predicate::by_kid(kid);
    let map = query.select_map(container, &predicate, pop)?;
    Ok(map.into_values().next().map(|(_, _, v)| v))
}

/// `delete`: delete by primary key (int) or by comma-tag match (string).
pub fn delete(conn: &ConnectionManager, dual: &Dual, container: &str, wild: bool) -> Result<()> {
    let store = RowStore::new(conn);
    match dual {
        Dual::Offset(kid) => store.delete_by_kid(container, *kid),
        Dual::Tags(csvstr) => {
            let predicate = Predicate::from_comma_tags(csvstr, wild);
            store.delete_predicate(container, &predicate.sql, predicate.params)
        }
    }
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

    fn insert(conn: &ConnectionManager, container: &str, notes: &str, value: i64) {
        let bytes = granary_codec::encode(&Value::Int(value), granary_codec::CompressionLevel::default()).unwrap();
        RowStore::new(conn).insert_batch(container, vec![(notes.to_string(), bytes)]).unwrap();
    }

    #[test]
    fn seed_scenario_latest_by_tags() {
        let (_dir, mgr) = manager();
        insert(&mgr, "goldfinger", "#plan agent007 #london", 911);
        insert(&mgr, "goldfinger", "agent006 #paris #plan", 411);

        let latest = select_latest(&mgr, &"agent00[1-7],#plan".into(), "goldfinger", false).unwrap();
        assert_eq!(latest, Some(Value::Int(411)));

        let map = select_map(&mgr, &"agent00[1-7],#plan".into(), "goldfinger", false).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1].1, "#plan agent007 #london");
        assert_eq!(map[&2].1, "agent006 #paris #plan");
        assert!(map[&1].0 <= map[&2].0);

        assert_eq!(select_latest(&mgr, &Dual::Offset(0), "goldfinger", false).unwrap(), Some(Value::Int(411)));
        assert_eq!(select_latest(&mgr, &Dual::Offset(1), "goldfinger", false).unwrap(), Some(Value::Int(911)));
    }

    /// Seed scenario 4: popping the offset form leaves max_kid == 1.
    #[test]
    fn seed_scenario_pop_offset() {
        let (_dir, mgr) = manager();
        insert(&mgr, "goldfinger", "#plan agent007 #london", 911);
        insert(&mgr, "goldfinger", "agent006 #paris #plan", 411);

        let popped = select_latest(&mgr, &Dual::Offset(0), "goldfinger", true).unwrap();
        assert_eq!(popped, Some(Value::Int(411)));
        assert_eq!(RowStore::new(&mgr).max_kid("goldfinger").unwrap(), 1);
    }

    /// Seed scenario 5: deleting by a single-char-class tag removes both rows.
    #[test]
    fn seed_scenario_delete_by_tag() {
        let (_dir, mgr) = manager();
        insert(&mgr, "goldfinger", "#plan agent007 #london", 911);
        insert(&mgr, "goldfinger", "agent006 #paris #plan", 411);

        delete(&mgr, &"agent00?".into(), "goldfinger", true).unwrap();
        let map = select_map(&mgr, &Dual::Offset(0), "goldfinger", false).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn tag_based_select_latest_pop_deletes_only_the_latest_match() {
        let (_dir, mgr) = manager();
        insert(&mgr, "t", "#x", 1);
        insert(&mgr, "t", "#x", 2);

        let popped = select_latest(&mgr, &"#x".into(), "t", true).unwrap();
        assert_eq!(popped, Some(Value::Int(2)));

        // kid=1 (notes "#x") still matches the tag query and survives.
        let remaining = select_map(&mgr, &"#x".into(), "t", false).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[&1].2, Value::Int(1));
    }

    #[test]
    fn insertion_order_oldest_first() {
        let (_dir, mgr) = manager();
        insert(&mgr, "t", "a", 1);
        insert(&mgr, "t", "b", 2);
        insert(&mgr, "t", "c", 3);

        assert_eq!(select_oldest(&mgr, 0, "t", false).unwrap(), Some(Value::Int(1)));
        assert_eq!(select_oldest(&mgr, 1, "t", false).unwrap(), Some(Value::Int(2)));
        assert_eq!(select_oldest(&mgr, 2, "t", false).unwrap(), Some(Value::Int(3)));
    }

    #[test]
    fn fifo_pops_the_oldest_row() {
        let (_dir, mgr) = manager();
        insert(&mgr, "t", "a", 1);
        insert(&mgr, "t", "b", 2);

        assert_eq!(fifo(&mgr, "t").unwrap(), Some(Value::Int(1)));
        assert_eq!(fifo(&mgr, "t").unwrap(), Some(Value::Int(2)));
        assert_eq!(fifo(&mgr, "t").unwrap(), None);
    }

    #[test]
    fn by_key_retrieves_a_single_row() {
        let (_dir, mgr) = manager();
        insert(&mgr, "t", "a", 1);
        insert(&mgr, "t", "b", 2);
        assert_eq!(by_key(&mgr, 2, "t", false).unwrap(), Some(Value::Int(2)));
        assert_eq!(by_key(&mgr, 999, "t", false).unwrap(), None);
    }
}
