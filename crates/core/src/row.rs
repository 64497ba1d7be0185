//! The persistent row shape: `(kid, tunix, notes, pzblob)`.

use crate::value::Value;

/// One decoded row, as handed back from a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kid: i64,
    pub tunix: i64,
    pub notes: String,
    pub value: Value,
}
