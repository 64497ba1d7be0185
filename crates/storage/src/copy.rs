//! Cross-file copy: stream matching rows from one warehouse file into
//! another, in ascending `kid` order, with fresh timestamps at the
//! destination.

use granary_codec::CompressionLevel;
use granary_core::{Error, Result};

use crate::connection::ConnectionManager;
use crate::query::{Predicate, QuerySurface};
use crate::retrieval::Dual;
use crate::rows::RowStore;

/// Copy every row matching `dual` from `(source_conn, source_container)`
/// into `(target_conn, target_container)`.
///
/// Rows are re-encoded at the configured `compression_level` and inserted
/// via `insert_stream`, so the destination gets fresh `kid`s and fresh
/// timestamps but preserves relative insertion order. Refused with
/// `Error::IllegalCopy` when source and destination are exactly the same
/// container in the same file — there would be nothing to do, and the
/// naive implementation would double every row.
///
/// `wild` controls comma-tag matching the same way it does for `delete`:
/// `true` GLOB-matches each tag term, `false` requires an exact term match.
/// It has no effect when `dual` is an offset.
///
/// `pop`, when set, deletes the matched rows from the source as part of
/// the same read that selects them (the farm's `reap` uses this so the
/// delete can't race a second query of the same predicate).
#[allow(clippy::too_many_arguments)]
pub fn copy(
    source_conn: &ConnectionManager,
    target_conn: &ConnectionManager,
    dual: &Dual,
    source_container: &str,
    target_container: &str,
    compression_level: CompressionLevel,
    wild: bool,
    pop: bool,
) -> Result<()> {
    if source_conn.path() == target_conn.path() && source_container == target_container {
        return Err(Error::IllegalCopy);
    }

    let query = QuerySurface::new(source_conn);
    let predicate = match dual {
        Dual::Offset(m) => {
            let max_kid = RowStore::new(source_conn).max_kid(source_container)?;
            Predicate::last_n_plus_one(max_kid, *m)
        }
        Dual::Tags(csvstr) => Predicate::from_comma_tags(csvstr, wild),
    };
    let matches = query.select_map(source_container, &predicate, pop)?;

    // `ResultMap` is a `BTreeMap<kid, _>`, so this iteration is already in
    // ascending `kid` order — relative insertion order at the source.
    let encoded = matches
        .into_values()
        .map(|(_, notes, value)| {
            granary_codec::encode(&value, compression_level)
                .map(|blob| (notes, blob))
                .map_err(|e| Error::EncodeFailed(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    RowStore::new(target_conn).insert_stream(target_container, encoded.into_iter())
}
