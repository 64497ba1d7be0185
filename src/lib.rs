//! # Granary
//!
//! An embedded object warehouse: a single-file SQLite store that warehouses
//! arbitrarily structured values under free-form text annotations, queryable
//! by comma-tag glob patterns or `kid` offset — no SQL required — plus a
//! sharded write farm that absorbs high-concurrency inserts and
//! probabilistically harvests them into a target file.
//!
//! # Quick Start
//!
//! ```no_run
//! use granary::{StoreConfig, Value, Warehouse};
//!
//! fn main() -> granary::Result<()> {
//!     let wh = Warehouse::open(StoreConfig::new("./goldfinger.sqlite"))?;
//!
//!     wh.insert(&Value::Int(911), "#plan agent007 #london", Some("goldfinger"))?;
//!     wh.insert(&Value::Int(411), "agent006 #paris #plan", Some("goldfinger"))?;
//!
//!     // Comma-tag query: every term must GLOB-match the annotation.
//!     let latest = wh.select_latest("agent00[1-7],#plan", Some("goldfinger"), false)?;
//!     assert_eq!(latest, Some(Value::Int(411)));
//!
//!     // Offset query: 0 is the newest row, 1 the one before it, ...
//!     let previous = wh.select_latest(1i64, Some("goldfinger"), false)?;
//!     assert_eq!(previous, Some(Value::Int(911)));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Components
//!
//! | Component | Purpose | Key operations |
//! |-----------|---------|-----------------|
//! | **Codec** | Self-describing compressed encoding of any `Value` | `encode`, `decode` |
//! | **Store** | One SQLite file, one or more containers | `insert`, `select_latest`, `select_map`, `delete` |
//! | **Maintenance** | Age-based pruning and file compaction | `prune`, `vacuum`, `clean` |
//! | **Farm** | Sharded absorber for concurrent writers | `farm_insert`, `harvest`, `plant` |
//!
//! # Architecture
//!
//! [`Warehouse`] is the main entry point: it wraps a `granary_storage::Store`
//! and desugars every call to exactly one storage-layer operation.
//! [`FarmedWarehouse`] additionally fronts a [`Farm`] for high-concurrency
//! insert workloads. Internal crates (`granary-storage`, `granary-farm`,
//! `granary-codec`) are not re-exported in full; only the façade types and
//! the shared `Value`/`Error` vocabulary are part of the stable surface.

pub use granary_api::{FarmedWarehouse, Warehouse};
pub use granary_core::{Error, Result, Row, Value};
pub use granary_farm::{Farm, FarmConfig};
pub use granary_storage::{Dual, Isolation, StoreConfig};
