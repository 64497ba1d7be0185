//! The shard farm: a fixed number of shard files absorbing concurrent
//! inserts, probabilistically harvested into a target warehouse file.
//!
//! There is no metadata tracking shard population or outstanding rows —
//! `harvest`'s Bernoulli draw amortizes the cost of cross-file movement
//! without it, trading a little variance in batch size for zero bookkeeping.

pub mod config;
pub mod harvest;
pub mod plant;
pub mod shard;

pub use config::FarmConfig;
pub use harvest::{harvest, reap};
pub use plant::{clean_all_shards, plant, REAP_ALL_BARNS};
pub use shard::Farm;
