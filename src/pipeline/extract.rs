//! The page-window walk: raw tables in, concatenated rows out.
//!
//! This stage owns the extraction semantics — window clamping, row/cell
//! cleaning, one-shot header detection and progress cadence — while the
//! actual table detection lives behind [`TableSource`], so the logic here
//! is exercised with synthetic documents in tests and with the pdfium
//! backend in production.

use crate::config::ExtractionConfig;
use crate::error::RolError;
use crate::progress::ExtractionProgress;
use crate::table::{ProcedureTable, RawTable};
use tracing::{debug, info, warn};

/// A document that can report its page count and yield detected tables
/// for a given 0-indexed page.
///
/// The production implementation is
/// [`crate::pipeline::pdfium::PdfiumTableSource`]; tests substitute an
/// in-memory fake.
pub trait TableSource {
    fn page_count(&self) -> usize;
    fn tables_on_page(&self, page_index: usize) -> Result<Vec<RawTable>, RolError>;
}

/// Result of one window walk, before normalization.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    /// The concatenated table (header + raw data rows).
    pub table: ProcedureTable,
    /// 0-indexed window actually scanned, after clamping.
    pub window: (usize, usize),
    /// Number of pages visited.
    pub pages_scanned: usize,
    /// Whether the requested window end was clamped to the document.
    pub clamped: bool,
}

/// Walk the configured page window and concatenate every cleaned row.
///
/// Header detection happens once, on the window's first page: the first
/// cleaned row containing one of the configured keywords as a substring
/// of any cell becomes the column-name sequence; rows at or before it on
/// that page are dropped, everything after — and every row of every later
/// page — is data. Any per-page failure propagates: there is no partial
/// output.
pub fn extract_tables(
    source: &dyn TableSource,
    config: &ExtractionConfig,
    progress: &dyn ExtractionProgress,
) -> Result<ExtractionOutput, RolError> {
    let total_pages = source.page_count();
    let start = config.window_start;
    let mut end = config.window_end;
    let mut clamped = false;

    if total_pages < end + 1 {
        warn!(
            "Document has only {} pages; clamping window end {} to the last page",
            total_pages,
            end + 1
        );
        end = total_pages.saturating_sub(1);
        clamped = true;
        progress.on_clamped(total_pages);
    }

    // A document shorter than the whole window yields an empty result, not
    // an error; the caller reports the empty-result diagnostic.
    if total_pages == 0 || start > end {
        progress.on_complete(0);
        return Ok(ExtractionOutput {
            table: ProcedureTable::default(),
            window: (start, end),
            pages_scanned: 0,
            clamped,
        });
    }

    info!("Extracting tables from pages {} to {}", start + 1, end + 1);
    progress.on_start(start + 1, end + 1);

    let window_len = end - start + 1;
    let mut table = ProcedureTable::default();
    let mut header_found = false;

    for page_index in start..=end {
        let raw_tables = source.tables_on_page(page_index)?;

        for raw in raw_tables {
            let cleaned = clean_table(raw);
            if cleaned.is_empty() {
                continue;
            }

            if page_index == start && !header_found {
                match find_header(&cleaned, &config.header_keywords) {
                    Some(at) => {
                        debug!("Header row found at position {at} on page {}", page_index + 1);
                        table.columns = Some(cleaned[at].clone());
                        table.rows.extend(cleaned.into_iter().skip(at + 1));
                        header_found = true;
                    }
                    None => table.rows.extend(cleaned),
                }
            } else {
                table.rows.extend(cleaned);
            }
        }

        let done = page_index - start + 1;
        if done % config.progress_every == 0 {
            progress.on_pages(done, window_len);
        }
    }

    info!("Extraction produced {} raw rows", table.rows.len());
    progress.on_complete(table.rows.len());

    Ok(ExtractionOutput {
        table,
        window: (start, end),
        pages_scanned: window_len,
        clamped,
    })
}

/// Clean one raw table: drop rows whose every cell is absent or blank,
/// then drop blank cells from the rows that survive.
///
/// Known limitation, preserved deliberately: dropping a blank cell does
/// not shift the remaining cells back into their original column
/// positions, so a ragged row can end up misaligned against the header.
/// The source document never triggers this on its data rows (every kept
/// row leads with a code), and "fixing" it here would silently change
/// the published output.
pub fn clean_table(raw: RawTable) -> Vec<Vec<String>> {
    raw.into_iter()
        .filter(|row| {
            row.iter()
                .any(|cell| cell.as_deref().is_some_and(|s| !s.trim().is_empty()))
        })
        .map(|row| {
            row.into_iter()
                .filter_map(|cell| {
                    let text = cell.map(|s| s.trim().to_string()).unwrap_or_default();
                    if text.is_empty() {
                        None
                    } else {
                        Some(text)
                    }
                })
                .collect()
        })
        .collect()
}

/// Position of the first row containing any keyword as a cell substring.
fn find_header(rows: &[Vec<String>], keywords: &[String]) -> Option<usize> {
    rows.iter().position(|row| {
        row.iter()
            .any(|cell| keywords.iter().any(|kw| cell.contains(kw.as_str())))
    })
}
