//! The tabular data model shared by the extraction stages.
//!
//! Two layers exist on purpose. A [`RawTable`] is what a
//! [`crate::pipeline::extract::TableSource`] hands back per page: rows of
//! *optional* cells, because a cell in a detected grid can simply be
//! absent. A [`ProcedureTable`] is the cleaned, concatenated result —
//! string cells, optionally named columns, ragged rows tolerated.

use serde::{Deserialize, Serialize};

/// One physical table row as detected on a page; `None` is an absent cell.
pub type RawRow = Vec<Option<String>>;

/// All rows of one detected table.
pub type RawTable = Vec<RawRow>;

/// The concatenated procedure table.
///
/// `columns` is `Some` once a header row was detected on the window's
/// first page; otherwise columns are positional. Data rows are not
/// aligned to the header length — downstream code must tolerate ragged
/// rows (they are padded only at CSV serialization time).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureTable {
    /// Column labels from the detected header row, if any.
    pub columns: Option<Vec<String>>,
    /// Data rows, in extraction order.
    pub rows: Vec<Vec<String>>,
}

impl ProcedureTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row in the table, or the header length if that is wider.
    pub fn width(&self) -> usize {
        let data = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        match &self.columns {
            Some(cols) => data.max(cols.len()),
            None => data,
        }
    }

    /// Labels used when serializing: the header row when present,
    /// positional indices (`"0"`, `"1"`, …) otherwise.
    pub fn labels(&self) -> Vec<String> {
        match &self.columns {
            Some(cols) => cols.clone(),
            None => (0..self.width()).map(|i| i.to_string()).collect(),
        }
    }
}

/// Row-admission predicate: does the first cell start with an ASCII digit?
///
/// This is the sole structural validity check applied to extracted rows.
/// An absent first cell fails, as does an empty or non-digit-leading one.
pub fn leads_with_digit(cell: Option<&str>) -> bool {
    cell.and_then(|s| s.chars().next())
        .map(|c| c.is_ascii_digit())
        .unwrap_or(false)
}
