//! Moving rows out of a shard and into a target file.

use granary_core::Result;
use granary_storage::{Dual, Store, StoreConfig};
use std::path::Path;
use tracing::debug;

use crate::shard::Farm;

/// Copy every row in `shard_index` matching `dual` into `target_file`'s
/// `target_container`, then delete them from the shard.
///
/// A shard file that doesn't exist yet (no insert has landed on it) is a
/// common race under bursty first-writes, not an error: it's logged at
/// `debug` and treated as "nothing to reap".
pub fn reap(
    farm: &Farm,
    dual: &Dual,
    source_container: &str,
    target_container: &str,
    shard_index: usize,
    target_file: impl AsRef<Path>,
    wild: bool,
) -> Result<()> {
    if !farm.shard_exists(shard_index) {
        debug!(shard_index, "reap: shard file does not exist yet, nothing to reap");
        return Ok(());
    }
    let shard = farm.shard_store(shard_index)?;
    let target = Store::open(StoreConfig::new(target_file.as_ref()))?;

    granary_storage::copy::copy(
        shard.connection(),
        target.connection(),
        dual,
        source_container,
        target_container,
        target.config().compression_level,
        wild,
        true,
    )
}

/// With probability `1/batch_size`, reap `shard_index`; otherwise a no-op.
/// Expected movement across many inserts is `batch_size` rows per harvest
/// event.
pub fn harvest(
    farm: &Farm,
    dual: &Dual,
    source_container: &str,
    target_container: &str,
    shard_index: usize,
    target_file: impl AsRef<Path>,
    wild: bool,
    batch_size: u32,
) -> Result<()> {
    if !farm.bernoulli(batch_size) {
        return Ok(());
    }
    debug!(shard_index, batch_size, "harvest: Bernoulli draw fired, reaping");
    reap(farm, dual, source_container, target_container, shard_index, target_file, wild)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FarmConfig;
    use granary_core::Value;

    #[test]
    fn reap_on_an_absent_shard_is_a_silent_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path().join("shards")).with_shard_count(2)).unwrap();
        let target = dir.path().join("target.sqlite");
        reap(&farm, &"".into(), "t", "t", 0, &target, true).unwrap();
        assert!(!target.exists());
    }

    #[test]
    fn reap_moves_every_matching_row_and_empties_the_shard() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path().join("shards")).with_shard_count(2)).unwrap();
        farm.farm_insert(&Value::Int(1), "a", "t", 0).unwrap();
        farm.farm_insert(&Value::Int(2), "b", "t", 0).unwrap();

        let target_file = dir.path().join("target.sqlite");
        reap(&farm, &"".into(), "t", "t", 0, &target_file, true).unwrap();

        let target = Store::open(StoreConfig::new(&target_file)).unwrap();
        let map = target.select_map(&Dual::Offset(2), Some("t"), false).unwrap();
        assert_eq!(map.len(), 2);

        let shard = farm.shard_store(0).unwrap();
        let remaining = shard.select_map(&Dual::Offset(10), Some("t"), false).unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn harvest_probability_one_always_reaps() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path().join("shards")).with_shard_count(1)).unwrap();
        farm.farm_insert(&Value::Int(1), "a", "t", 0).unwrap();

        let target_file = dir.path().join("target.sqlite");
        harvest(&farm, &"".into(), "t", "t", 0, &target_file, true, 1).unwrap();

        let target = Store::open(StoreConfig::new(&target_file)).unwrap();
        assert_eq!(target.select_map(&Dual::Offset(1), Some("t"), false).unwrap().len(), 1);
    }
}
