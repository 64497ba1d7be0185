//! Per-instance store configuration.
//!
//! There is deliberately no process-wide default database path: the
//! original source's `Base.db0` class attribute is replaced by a required
//! `path` on [`StoreConfig`]. A convenience default is offered only at the
//! CLI layer, not here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use granary_codec::CompressionLevel;
use granary_core::{Error, Result};

/// SQLite transaction isolation level used for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Isolation {
    Deferred,
    #[default]
    Immediate,
    Exclusive,
}

impl Isolation {
    pub fn as_behavior(self) -> rusqlite::TransactionBehavior {
        match self {
            Isolation::Deferred => rusqlite::TransactionBehavior::Deferred,
            Isolation::Immediate => rusqlite::TransactionBehavior::Immediate,
            Isolation::Exclusive => rusqlite::TransactionBehavior::Exclusive,
        }
    }
}

pub const DEFAULT_CONTAINER: &str = "tmptable";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite file backing this store.
    pub path: PathBuf,
    /// Container used by operations that don't specify one explicitly.
    pub default_container: String,
    /// Busy timeout before a write lock acquisition fails.
    pub busy_timeout: Duration,
    /// Transaction isolation used for write operations.
    pub isolation: Isolation,
    /// Codec compression level (1-9).
    pub compression_level: CompressionLevel,
}

impl StoreConfig {
    /// Create a config pointed at `path`, with every other knob defaulted.
    pub fn new(path: impl AsRef<Path>) -> Self {
        StoreConfig {
            path: path.as_ref().to_path_buf(),
            default_container: DEFAULT_CONTAINER.to_string(),
            busy_timeout: Duration::from_secs(14),
            isolation: Isolation::Immediate,
            compression_level: CompressionLevel::default(),
        }
    }

    pub fn with_default_container(mut self, name: impl Into<String>) -> Self {
        self.default_container = name.into();
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_compression_level(mut self, level: u8) -> Result<Self> {
        self.compression_level = CompressionLevel::new(level)
            .ok_or_else(|| Error::InvalidConfig(format!("compression level {level} out of range 1-9")))?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.busy_timeout.is_zero() {
            return Err(Error::InvalidConfig("busy_timeout must be non-zero".into()));
        }
        granary_core::validate_container_name(&self.default_container)?;
        Ok(())
    }
}
