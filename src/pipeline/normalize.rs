//! Normalization: dedup, row admission, legend substitution.
//!
//! Three ordered, independent passes over the concatenated table. Each is
//! a pure `Table → Table` transformation with no shared state, so the
//! pipeline is easy to reason about and each rule is testable on its own.
//!
//! Substitution only runs when the table has *named* columns: with
//! positional columns there is no textual label, and the published
//! behaviour is to leave the cells untouched in that case.

use crate::error::RolError;
use crate::table::{leads_with_digit, ProcedureTable};
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Drop empty rows, drop exact duplicates, keep only digit-led rows.
///
/// Duplicate removal keeps the first occurrence and preserves order.
/// The admission filter reads the first column: rows whose first cell
/// does not start with an ASCII digit are removed — that includes rows
/// with an absent first cell.
pub fn normalize(table: ProcedureTable) -> ProcedureTable {
    let mut rows = table.rows;

    rows.retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));

    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    rows.retain(|row| seen.insert(row.clone()));

    if !rows.is_empty() {
        let before = rows.len();
        rows.retain(|row| leads_with_digit(row.first().map(String::as_str)));
        debug!("Admission filter kept {}/{} rows", rows.len(), before);
    }

    ProcedureTable {
        columns: table.columns,
        rows,
    }
}

/// Expand abbreviation codes to their full descriptions.
///
/// Each `(code, description)` pair is applied as one whole-word,
/// case-sensitive pass over every cell of every column. Passes run in
/// legend order; a pass never rescans the text produced by an earlier
/// one for its own code, but a cell holding several different codes gets
/// all of them expanded.
pub fn substitute(
    mut table: ProcedureTable,
    abbreviations: &[(String, String)],
) -> Result<ProcedureTable, RolError> {
    if table.columns.is_none() {
        debug!("No named columns; skipping abbreviation substitution");
        return Ok(table);
    }

    for (code, description) in abbreviations {
        let pattern = format!(r"\b{}\b", regex::escape(code));
        let re = Regex::new(&pattern).map_err(|e| {
            RolError::InvalidConfig(format!("Bad abbreviation code '{code}': {e}"))
        })?;

        for row in &mut table.rows {
            for cell in row.iter_mut() {
                if re.is_match(cell) {
                    *cell = re
                        .replace_all(cell, regex::NoExpand(description.as_str()))
                        .into_owned();
                }
            }
        }
    }
    Ok(table)
}
