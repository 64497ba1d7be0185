//! Shard routing: the `Farm` holds the shard directory, a process-lifetime
//! RNG, and the shard-local insert primitive `farm_insert`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

use granary_core::{Result, Value};
use granary_storage::{Store, StoreConfig};

use crate::config::FarmConfig;

pub struct Farm {
    pub(crate) config: FarmConfig,
    /// Seeded once here, at construction — never reseeded per call, so the
    /// Bernoulli draws in `harvest`/`plant` have valid statistical
    /// properties across the farm's lifetime.
    pub(crate) rng: Mutex<StdRng>,
}

impl Farm {
    pub fn new(config: FarmConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.dir)?;
        Ok(Farm {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    pub fn config(&self) -> &FarmConfig {
        &self.config
    }

    pub fn shard_count(&self) -> usize {
        self.config.shard_count
    }

    pub fn shard_exists(&self, shard_index: usize) -> bool {
        self.config.shard_path(shard_index).exists()
    }

    pub(crate) fn shard_store(&self, shard_index: usize) -> Result<Store> {
        Store::open(StoreConfig::new(self.config.shard_path(shard_index)))
    }

    /// Insert directly into `barn<shard_index>.sqlite`.
    pub fn farm_insert(&self, value: &Value, annotation: &str, container: &str, shard_index: usize) -> Result<()> {
        let store = self.shard_store(shard_index)?;
        store.insert(annotation, value, Some(container))
    }

    /// Draw a shard index uniformly from `[0, shard_count)` using the
    /// farm's process-lifetime RNG.
    pub(crate) fn random_shard_index(&self) -> usize {
        use rand::Rng;
        let mut rng = self.rng.lock().expect("farm rng poisoned");
        rng.gen_range(0..self.config.shard_count)
    }

    /// Draw a `bool` that's `true` with probability `1/denominator`.
    pub(crate) fn bernoulli(&self, denominator: u32) -> bool {
        use rand::Rng;
        let mut rng = self.rng.lock().expect("farm rng poisoned");
        rng.gen_range(0..denominator) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_insert_writes_into_the_chosen_shard() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path()).with_shard_count(3)).unwrap();
        farm.farm_insert(&Value::Int(42), "note", "t", 1).unwrap();
        assert!(farm.shard_exists(1));
        assert!(!farm.shard_exists(0));
    }

    #[test]
    fn random_shard_index_stays_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path()).with_shard_count(4)).unwrap();
        for _ in 0..100 {
            assert!(farm.random_shard_index() < 4);
        }
    }
}
