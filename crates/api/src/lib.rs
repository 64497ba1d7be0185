//! The `Warehouse` façade: the public operation surface over a single
//! warehouse file, plus a thin wrapper over the shard farm.
//!
//! [`Warehouse`] desugars every call to exactly one `granary_storage` (or
//! `granary_farm`) call, with no hidden semantics of its own.

use std::io::Read;
use std::path::Path;

use granary_core::{Error, Result, Value};
use granary_farm::{Farm, FarmConfig};
use granary_storage::{Dual, Store, StoreConfig};

/// A single warehouse file, opened once and reused for every call.
pub struct Warehouse {
    store: Store,
}

impl Warehouse {
    pub fn open(config: StoreConfig) -> Result<Self> {
        Ok(Warehouse { store: Store::open(config)? })
    }

    /// Convenience constructor using every `StoreConfig` default.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(StoreConfig::new(path))
    }

    pub fn config(&self) -> &StoreConfig {
        self.store.config()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn insert(&self, value: &Value, notes: impl Into<String>, container: Option<&str>) -> Result<()> {
        self.store.insert(notes, value, container)
    }

    pub fn insert_batch(&self, pairs: Vec<(Value, String)>, container: Option<&str>) -> Result<()> {
        let pairs = pairs.into_iter().map(|(v, notes)| (notes, v)).collect();
        self.store.insert_batch(pairs, container)
    }

    /// Lazy N-rows-in, one transaction: consumes an iterator so the whole
    /// batch never needs to live in memory at once.
    pub fn insert_stream(
        &self,
        pairs: impl Iterator<Item = (Value, String)>,
        container: Option<&str>,
    ) -> Result<()> {
        self.store.insert_stream(pairs.map(|(v, notes)| (notes, v)), container)
    }

    /// Read `path` as raw bytes, then `insert` them as `Value::Bytes`.
    pub fn insert_file(&self, path: impl AsRef<Path>, notes: impl Into<String>, container: Option<&str>) -> Result<()> {
        let bytes = std::fs::read(path)?;
        self.insert(&Value::Bytes(bytes), notes, container)
    }

    /// Fetch `url`'s body, then `insert` it as `Value::Bytes`. If `notes` is
    /// empty, the URL itself becomes the annotation, mirroring the original
    /// `inweb` convenience.
    pub fn insert_url(&self, url: &str, notes: impl Into<String>, container: Option<&str>) -> Result<()> {
        let notes = notes.into();
        let notes = if notes.is_empty() { url.to_string() } else { notes };
        let body = ureq::get(url)
            .call()
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        let mut bytes = Vec::new();
        body.into_reader()
            .read_to_end(&mut bytes)
            .map_err(Error::Io)?;
        self.insert(&Value::Bytes(bytes), notes, container)
    }

    pub fn select_latest(&self, dual: impl Into<Dual>, container: Option<&str>, pop: bool) -> Result<Option<Value>> {
        self.store.select_latest(&dual.into(), container, pop)
    }

    pub fn select_map(&self, dual: impl Into<Dual>, container: Option<&str>, pop: bool) -> Result<granary_storage::ResultMap> {
        self.store.select_map(&dual.into(), container, pop)
    }

    pub fn select_oldest(&self, n: i64, container: Option<&str>, pop: bool) -> Result<Option<Value>> {
        self.store.select_oldest(n, container, pop)
    }

    pub fn fifo(&self, container: Option<&str>) -> Result<Option<Value>> {
        self.store.fifo(container)
    }

    pub fn by_key(&self, kid: i64, container: Option<&str>, pop: bool) -> Result<Option<Value>> {
        self.store.by_key(kid, container, pop)
    }

    pub fn delete(&self, dual: impl Into<Dual>, container: Option<&str>, wild: bool) -> Result<()> {
        self.store.delete(&dual.into(), container, wild)
    }

    pub fn drop_container(&self, container: Option<&str>) -> Result<()> {
        self.store.drop_container(container)
    }

    pub fn prune(&self, days: Option<i64>, container: Option<&str>) -> Result<()> {
        self.store.prune(days, container)
    }

    pub fn vacuum(&self) -> Result<()> {
        self.store.vacuum()
    }

    pub fn clean(&self, days: Option<i64>, container: Option<&str>) -> Result<()> {
        self.store.clean(days, container)
    }

    /// Cross-file copy into a different already-open `Warehouse`.
    pub fn copy_into(
        &self,
        target: &Warehouse,
        dual: impl Into<Dual>,
        source_container: Option<&str>,
        target_container: Option<&str>,
        wild: bool,
    ) -> Result<()> {
        self.store.copy_into(&target.store, &dual.into(), source_container, target_container, wild)
    }
}

/// A warehouse file fronted by a shard farm: inserts land on a random
/// shard and are probabilistically harvested into the warehouse file.
pub struct FarmedWarehouse {
    warehouse: Warehouse,
    farm: Farm,
}

impl FarmedWarehouse {
    pub fn open(store_config: StoreConfig, farm_config: FarmConfig) -> Result<Self> {
        Ok(FarmedWarehouse {
            warehouse: Warehouse::open(store_config)?,
            farm: Farm::new(farm_config)?,
        })
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn farm(&self) -> &Farm {
        &self.farm
    }

    /// The farm summary operation: insert into a random shard, then
    /// probabilistically harvest that shard into this warehouse's file.
    pub fn plant(&self, value: &Value, notes: &str, container: &str) -> Result<()> {
        granary_farm::plant(&self.farm, value, notes, container, self.warehouse.config().path.clone())
    }
}
