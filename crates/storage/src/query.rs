//! Translate caller-supplied comma-tag expressions or numeric offsets into
//! parameterized predicates, execute them, and materialize a result map.

use std::collections::BTreeMap;

use granary_codec::decode;
use granary_core::{Error, Result, Value};
use rusqlite::types::Value as SqlParam;
use tracing::warn;

use crate::connection::{ConnectionManager, ParamRow};
use crate::rows::RowStore;

/// `kid -> (tunix, notes, value)`, as the original source's `selectdic`
/// returns it.
pub type ResultMap = BTreeMap<i64, (i64, String, Value)>;

/// Convert a comma-separated tag string into GLOB parameters.
///
/// Whitespace inside a term is preserved and significant. `wild=true`
/// wraps each term in `*...*`; `wild=false` passes terms through verbatim
/// so the caller can supply their own wildcards.
pub fn comma_to_params(csvstr: &str, wild: bool) -> Vec<String> {
    csvstr
        .split(',')
        .map(|term| if wild { format!("*{term}*") } else { term.to_string() })
        .collect()
}

/// Build the conjunctive `WHERE notes GLOB ? AND notes GLOB ? ...` fragment
/// for a list of GLOB parameters.
pub fn notes_glob_predicate(n_terms: usize) -> String {
    let clauses: Vec<&str> = std::iter::repeat("notes GLOB ?").take(n_terms.max(1)).collect();
    format!("WHERE {}", clauses.join(" AND "))
}

/// A `WHERE ...` fragment plus its ordered bind parameters.
pub struct Predicate {
    pub sql: String,
    pub params: ParamRow,
}

impl Predicate {
    /// The comma-tag rule: one GLOB clause per term, ANDed together. An
    /// empty string with `wild=true` degenerates to a single `"**"`
    /// parameter that matches every row.
    pub fn from_comma_tags(csvstr: &str, wild: bool) -> Self {
        let terms = comma_to_params(csvstr, wild);
        let sql = notes_glob_predicate(terms.len());
        let params = terms.into_iter().map(SqlParam::Text).collect();
        Predicate { sql, params }
    }

    /// The offset rule, "last m rows" variant: `kid > max_kid - m`.
    pub fn last_n_plus_one(max_kid: i64, m: i64) -> Self {
        Predicate {
            sql: "WHERE kid > ?".to_string(),
            params: vec![SqlParam::Integer(max_kid - m)],
        }
    }

    /// The offset rule, "n-th newest" variant: at most one row.
    pub fn nth_newest(container: &str, n: i64) -> Self {
        Predicate {
            sql: format!("WHERE kid = (SELECT MAX(kid) - ? FROM {container})"),
            params: vec![SqlParam::Integer(n)],
        }
    }

    /// The offset rule, "n-th oldest" variant: at most one row.
    pub fn nth_oldest(container: &str, n: i64) -> Self {
        Predicate {
            sql: format!("WHERE kid = (SELECT MIN(kid) + ? FROM {container})"),
            params: vec![SqlParam::Integer(n)],
        }
    }

    pub fn by_kid(kid: i64) -> Self {
        Predicate {
            sql: "WHERE kid = ?".to_string(),
            params: vec![SqlParam::Integer(kid)],
        }
    }
}

pub struct QuerySurface<'a> {
    conn: &'a ConnectionManager,
}

impl<'a> QuerySurface<'a> {
    pub fn new(conn: &'a ConnectionManager) -> Self {
        QuerySurface { conn }
    }

    /// Execute `predicate` against `container`, decode every matching row,
    /// and build the result map. If `pop` is set, the same predicate is
    /// re-run as a delete *after* the result map is fully materialized —
    /// best-effort atomic with the read in the single-writer case only.
    pub fn select_map(&self, container: &str, predicate: &Predicate, pop: bool) -> Result<ResultMap> {
        granary_core::validate_container_name(container)?;
        let sql = format!("SELECT kid, tunix, notes, pzblob FROM {container} {}", predicate.sql);
        let raw: Vec<(i64, i64, String, Vec<u8>)> = match self.conn.stream_select(&sql, &predicate.params, |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        }) {
            Ok(rows) => rows,
            // Container doesn't exist yet: an empty result, not an error.
            Err(_) => Vec::new(),
        };

        let mut map = ResultMap::new();
        for (kid, tunix, notes, blob) in raw {
            match decode(&blob) {
                Ok(value) => {
                    map.insert(kid, (tunix, notes, value));
                }
                Err(e) => {
                    let refused = Error::DecodeRefused { kid, reason: e.to_string() };
                    warn!(kid, error = %refused, "select_map: skipping row with undecodable blob");
                }
            }
        }

        if pop {
            let store = RowStore::new(self.conn);
            store.delete_predicate(container, &predicate.sql, predicate.params.clone())?;
        }

        Ok(map)
    }
}
