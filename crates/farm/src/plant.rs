//! The published farm summary operation: insert into a random shard, then
//! probabilistically harvest it — plus the `clean_all_shards` maintenance
//! sweep and its `"reap_ALL_BARNS"` sentinel.

use std::path::Path;

use granary_core::{Result, Value};
use granary_storage::Dual;
use tracing::info;

use crate::harvest::{harvest, reap};
use crate::shard::Farm;

/// Annotation value that skips the insert and unconditionally reaps every
/// shard into the target, instead of the usual random-shard-plus-harvest
/// behavior.
pub const REAP_ALL_BARNS: &str = "reap_ALL_BARNS";

/// With probability on the order of `1e-5`, `plant` also runs
/// `clean_all_shards`. Expressed as a denominator for the same Bernoulli
/// machinery `harvest` uses.
const AUTO_CLEAN_DENOMINATOR: u32 = 100_000;

/// Insert `value` into a uniformly random shard, then harvest that shard
/// (probability `1/batch_size`) into `target_file`'s `container`.
///
/// If `annotation` is the [`REAP_ALL_BARNS`] sentinel, the insert is
/// skipped and every shard is unconditionally reaped into the target.
pub fn plant(
    farm: &Farm,
    value: &Value,
    annotation: &str,
    container: &str,
    target_file: impl AsRef<Path>,
) -> Result<()> {
    if annotation == REAP_ALL_BARNS {
        info!("plant: reap_ALL_BARNS sentinel, reaping every shard unconditionally");
        for shard_index in 0..farm.shard_count() {
            reap(farm, &"".into(), container, container, shard_index, target_file.as_ref(), true)?;
        }
        return Ok(());
    }

    let shard_index = farm.random_shard_index();
    farm.farm_insert(value, annotation, container, shard_index)?;
    harvest(
        farm,
        &Dual::Tags(String::new()),
        container,
        container,
        shard_index,
        target_file.as_ref(),
        true,
        farm.config().batch_size,
    )?;

    if let Some(fresh_days) = farm.config().default_fresh_days {
        if farm.bernoulli(AUTO_CLEAN_DENOMINATOR) {
            info!("plant: rare auto-clean pass firing");
            clean_all_shards(farm, container, fresh_days)?;
        }
    }

    Ok(())
}

/// Apply `clean(container, fresh_days)` to every shard, swallowing errors
/// from shards that don't exist.
pub fn clean_all_shards(farm: &Farm, container: &str, fresh_days: i64) -> Result<()> {
    for shard_index in 0..farm.shard_count() {
        if !farm.shard_exists(shard_index) {
            continue;
        }
        let shard = farm.shard_store(shard_index)?;
        shard.clean(Some(fresh_days), Some(container))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FarmConfig;
    use granary_storage::{Store, StoreConfig};

    /// Seed scenario 6: farm size 9, plant 500 times with batch_size=1
    /// (always harvest), then one reap_ALL_BARNS — the target ends up with
    /// exactly 500 rows.
    #[test]
    fn seed_scenario_farm_of_nine_plant_five_hundred_times() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(
            FarmConfig::new(dir.path().join("shards"))
                .with_shard_count(9)
                .with_batch_size(1),
        )
        .unwrap();
        let target_file = dir.path().join("target.sqlite");

        for i in 0..500 {
            plant(&farm, &Value::Str("myobj".into()), &format!("plant-{i}"), "t", &target_file).unwrap();
        }
        plant(&farm, &Value::Null, REAP_ALL_BARNS, "t", &target_file).unwrap();

        let target = Store::open(StoreConfig::new(&target_file)).unwrap();
        let all = target.select_map(&Dual::Offset(10_000), Some("t"), false).unwrap();
        assert_eq!(all.len(), 500);
    }

    #[test]
    fn reap_all_barns_skips_the_insert() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path().join("shards")).with_shard_count(2)).unwrap();
        let target_file = dir.path().join("target.sqlite");

        plant(&farm, &Value::Int(1), REAP_ALL_BARNS, "t", &target_file).unwrap();
        assert!(!target_file.exists() || {
            let target = Store::open(StoreConfig::new(&target_file)).unwrap();
            target.select_map(&Dual::Offset(10), Some("t"), false).unwrap().is_empty()
        });
    }

    #[test]
    fn clean_all_shards_swallows_absent_shards() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(FarmConfig::new(dir.path().join("shards")).with_shard_count(5)).unwrap();
        farm.farm_insert(&Value::Int(1), "a", "t", 2).unwrap();
        clean_all_shards(&farm, "t", 30).unwrap();
    }

    /// Each `harvest` fully drains the shard it fires on, so the target's
    /// row count only ever changes on a reap event — pinning `shard_count`
    /// to 1 isolates that signal from the separate random-shard draw.
    /// Over K plants with expected batch size B, the number of reap events
    /// is Binomial(K, 1/B): mean K/B, stddev sqrt(K/B * (1 - 1/B)).
    #[test]
    fn harvest_expectation_reap_count_tracks_k_over_b() {
        let dir = tempfile::tempdir().unwrap();
        let farm = Farm::new(
            FarmConfig::new(dir.path().join("shards"))
                .with_shard_count(1)
                .with_batch_size(5),
        )
        .unwrap();
        let target_file = dir.path().join("target.sqlite");

        let k = 500;
        let batch_size = 5.0_f64;
        let mut reap_events = 0u32;
        let mut last_count = 0usize;
        for i in 0..k {
            plant(&farm, &Value::Str("x".into()), &format!("p{i}"), "t", &target_file).unwrap();
            let count = if target_file.exists() {
                Store::open(StoreConfig::new(&target_file))
                    .unwrap()
                    .select_map(&Dual::Offset(10_000), Some("t"), false)
                    .unwrap()
                    .len()
            } else {
                0
            };
            if count != last_count {
                reap_events += 1;
                last_count = count;
            }
        }

        let expected = k as f64 / batch_size;
        let stddev = (k as f64 / batch_size * (1.0 - 1.0 / batch_size)).sqrt();
        let tolerance = 4.0 * stddev;
        assert!(
            (reap_events as f64 - expected).abs() <= tolerance,
            "reap_events={reap_events} expected={expected} +/- {tolerance}"
        );
    }
}
