//! Single-file SQLite-backed object warehouse.
//!
//! Layered like the original source's `Base -> Insertion/Subquery/Latest/
//! Oldest/Care` hierarchy, but split across modules instead of a class tree:
//! [`connection`] opens/executes/closes, [`schema`] manages containers,
//! [`rows`] inserts and deletes, [`query`] and [`retrieval`] answer reads,
//! [`maintenance`] prunes and compacts, [`copy`] moves rows between files.

pub mod config;
pub mod connection;
pub mod copy;
pub mod maintenance;
pub mod query;
pub mod retrieval;
pub mod rows;
pub mod schema;

pub use config::{Isolation, StoreConfig, DEFAULT_CONTAINER};
pub use connection::{ConnectionManager, ParamRow};
pub use query::{Predicate, QuerySurface, ResultMap};
pub use retrieval::Dual;
pub use rows::RowStore;

use granary_core::Result;

/// A single warehouse file: a `StoreConfig` plus the connection manager it
/// configures. This is the unit the farm shards and `granary-api`'s
/// `Warehouse` façade are built from.
pub struct Store {
    config: StoreConfig,
    conn: ConnectionManager,
}

impl Store {
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let conn = ConnectionManager::new(&config.path, config.busy_timeout, config.isolation.as_behavior());
        Ok(Store { config, conn })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.conn
    }

    fn container<'a>(&'a self, container: Option<&'a str>) -> &'a str {
        container.unwrap_or(&self.config.default_container)
    }

    pub fn insert(&self, notes: impl Into<String>, value: &granary_core::Value, container: Option<&str>) -> Result<()> {
        let container = self.container(container);
        let blob = granary_codec::encode(value, self.config.compression_level)
            .map_err(|e| granary_core::Error::EncodeFailed(e.to_string()))?;
        RowStore::new(&self.conn).insert_batch(container, vec![(notes.into(), blob)])
    }

    pub fn insert_batch(
        &self,
        pairs: Vec<(String, granary_core::Value)>,
        container: Option<&str>,
    ) -> Result<()> {
        let container = self.container(container);
        let encoded = pairs
            .into_iter()
            .map(|(notes, value)| {
                granary_codec::encode(&value, self.config.compression_level)
                    .map(|blob| (notes, blob))
                    .map_err(|e| granary_core::Error::EncodeFailed(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        RowStore::new(&self.conn).insert_batch(container, encoded)
    }

    /// Same contract as [`insert_batch`](Self::insert_batch), but consumes a
    /// lazy iterator so a streamed batch never needs to be materialized in
    /// memory all at once.
    pub fn insert_stream(
        &self,
        pairs: impl Iterator<Item = (String, granary_core::Value)>,
        container: Option<&str>,
    ) -> Result<()> {
        let container = self.container(container);
        let level = self.config.compression_level;
        let encoded = pairs.map(move |(notes, value)| {
            granary_codec::encode(&value, level)
                .map(|blob| (notes, blob))
                .map_err(|e| granary_core::Error::EncodeFailed(e.to_string()))
        });
        let mut first_err = None;
        let rows = encoded.filter_map(|r| match r {
            Ok(pair) => Some(pair),
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
                None
            }
        });
        RowStore::new(&self.conn).insert_stream(container, rows)?;
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn select_latest(&self, dual: &Dual, container: Option<&str>, pop: bool) -> Result<Option<granary_core::Value>> {
        retrieval::select_latest(&self.conn, dual, self.container(container), pop)
    }

    pub fn select_map(&self, dual: &Dual, container: Option<&str>, pop: bool) -> Result<ResultMap> {
        retrieval::select_map(&self.conn, dual, self.container(container), pop)
    }

    pub fn select_oldest(&self, n: i64, container: Option<&str>, pop: bool) -> Result<Option<granary_core::Value>> {
        retrieval::select_oldest(&self.conn, n, self.container(container), pop)
    }

    pub fn fifo(&self, container: Option<&str>) -> Result<Option<granary_core::Value>> {
        retrieval::fifo(&self.conn, self.container(container))
    }

    pub fn by_key(&self, kid: i64, container: Option<&str>, pop: bool) -> Result<Option<granary_core::Value>> {
        retrieval::by_key(&self.conn, kid, self.container(container), pop)
    }

    pub fn delete(&self, dual: &Dual, container: Option<&str>, wild: bool) -> Result<()> {
        retrieval::delete(&self.conn, dual, self.container(container), wild)
    }

    pub fn drop_container(&self, container: Option<&str>) -> Result<()> {
        schema::drop_container(&self.conn, self.container(container))
    }

    pub fn prune(&self, fresh_days: Option<i64>, container: Option<&str>) -> Result<()> {
        maintenance::prune(&self.conn, self.container(container), fresh_days)
    }

    pub fn vacuum(&self) -> Result<()> {
        maintenance::compact(&self.conn)
    }

    pub fn clean(&self, fresh_days: Option<i64>, container: Option<&str>) -> Result<()> {
        maintenance::clean(&self.conn, self.container(container), fresh_days)
    }

    pub fn copy_into(
        &self,
        target: &Store,
        dual: &Dual,
        source_container: Option<&str>,
        target_container: Option<&str>,
        wild: bool,
    ) -> Result<()> {
        copy::copy(
            &self.conn,
            &target.conn,
            dual,
            self.container(source_container),
            target.container(target_container),
            target.config.compression_level,
            wild,
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use granary_core::Value;

    fn temp_store(dir: &tempfile::TempDir, name: &str) -> Store {
        Store::open(StoreConfig::new(dir.path().join(name))).unwrap()
    }

    #[test]
    fn store_round_trips_through_the_default_container() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir, "db.sqlite");
        store.insert("#plan agent007", &Value::Int(911), None).unwrap();
        let got = store.select_latest(&Dual::Offset(0), None, false).unwrap();
        assert_eq!(got, Some(Value::Int(911)));
    }

    #[test]
    fn copy_into_moves_rows_between_stores() {
        let dir = tempfile::tempdir().unwrap();
        let a = temp_store(&dir, "a.sqlite");
        let b = temp_store(&dir, "b.sqlite");
        a.insert("tag", &Value::Str("hi".into()), Some("t")).unwrap();
        a.copy_into(&b, &"tag".into(), Some("t"), Some("t"), true).unwrap();
        assert_eq!(b.by_key(1, Some("t"), false).unwrap(), Some(Value::Str("hi".into())));
    }
}
