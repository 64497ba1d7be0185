//! Farm-wide configuration: shard directory, shard count, harvest batch
//! size.

use std::path::{Path, PathBuf};

use granary_core::{Error, Result};

pub const DEFAULT_SHARD_COUNT: usize = 8;
pub const DEFAULT_BATCH_SIZE: u32 = 50;

#[derive(Debug, Clone)]
pub struct FarmConfig {
    /// Directory holding `barn0.sqlite .. barn{N-1}.sqlite`.
    pub dir: PathBuf,
    /// Number of shard files.
    pub shard_count: usize,
    /// Expected number of rows accumulated per harvest (`reap` fires with
    /// probability `1/batch_size` per insert).
    pub batch_size: u32,
    /// Retention window `plant`'s rare (~1e-5) auto-clean pass uses.
    /// `None` disables the auto-clean pass entirely.
    pub default_fresh_days: Option<i64>,
}

impl FarmConfig {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FarmConfig {
            dir: dir.as_ref().to_path_buf(),
            shard_count: DEFAULT_SHARD_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            default_fresh_days: None,
        }
    }

    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_default_fresh_days(mut self, fresh_days: i64) -> Self {
        self.default_fresh_days = Some(fresh_days);
        self
    }

    pub fn shard_path(&self, shard_index: usize) -> PathBuf {
        self.dir.join(format!("barn{shard_index}.sqlite"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(Error::InvalidConfig("shard_count must be non-zero".into()));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be non-zero".into()));
        }
        Ok(())
    }
}
