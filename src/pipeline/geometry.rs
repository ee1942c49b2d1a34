//! Character-cluster table detection.
//!
//! pdfium reports per-character bounding boxes but has no notion of a
//! table, so the grid is reconstructed geometrically: characters are
//! glued into word fragments, fragments are clustered into visual rows by
//! vertical proximity, and the fragments' left edges across all rows
//! define the column positions. Everything here is pure over plain
//! coordinates so the whole detection path is unit-testable without a
//! PDF engine.
//!
//! Coordinates follow PDF user space: y grows upward, so the visually
//! first row has the *largest* `top` and rows are ordered by descending
//! `top`.

use crate::table::{RawRow, RawTable};

/// A run of characters sharing a baseline, with its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// One positioned character, as handed over by the PDF backend.
#[derive(Debug, Clone, Copy)]
pub struct CharBox {
    pub ch: char,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Tolerances for fragment, row and column clustering, in PDF points.
#[derive(Debug, Clone, Copy)]
pub struct GeometrySettings {
    /// Max vertical drift for two characters/fragments to share a row.
    pub y_tolerance: f64,
    /// Max horizontal drift for two fragment starts to share a column.
    pub x_tolerance: f64,
    /// Minimum rows for a page to count as containing a table.
    pub min_rows: usize,
    /// Minimum columns for a page to count as containing a table.
    pub min_cols: usize,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            y_tolerance: 3.0,
            x_tolerance: 3.0,
            min_rows: 2,
            min_cols: 2,
        }
    }
}

/// Glue characters into word fragments.
///
/// A new fragment starts on a whitespace character, a vertical jump
/// larger than `y_tolerance`, or a horizontal gap wider than 30% of the
/// current character's height (a cheap em-relative word gap that tracks
/// the font size without needing font metrics).
pub fn fragments_from_chars(
    chars: impl IntoIterator<Item = CharBox>,
    settings: &GeometrySettings,
) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current: Option<Fragment> = None;

    for c in chars {
        if c.ch.is_whitespace() {
            if let Some(f) = current.take() {
                fragments.push(f);
            }
            continue;
        }

        let height = (c.top - c.bottom).abs();
        let gap = (height * 0.3).max(1.0);

        let starts_new = match &current {
            None => true,
            Some(f) => (c.top - f.top).abs() > settings.y_tolerance || c.left - f.right > gap,
        };

        if starts_new {
            if let Some(f) = current.take() {
                fragments.push(f);
            }
            current = Some(Fragment {
                text: c.ch.to_string(),
                left: c.left,
                right: c.right,
                top: c.top,
                bottom: c.bottom,
            });
        } else if let Some(f) = current.as_mut() {
            f.text.push(c.ch);
            f.right = f.right.max(c.right);
            f.top = f.top.max(c.top);
            f.bottom = f.bottom.min(c.bottom);
        }
    }
    if let Some(f) = current.take() {
        fragments.push(f);
    }
    fragments
}

/// Cluster fragments into visual rows, top of page first.
pub fn cluster_rows(mut fragments: Vec<Fragment>, settings: &GeometrySettings) -> Vec<Vec<Fragment>> {
    if fragments.is_empty() {
        return Vec::new();
    }
    // Descending top: PDF user space grows upward.
    fragments.sort_by(|a, b| b.top.partial_cmp(&a.top).unwrap_or(std::cmp::Ordering::Equal));

    let mut rows: Vec<Vec<Fragment>> = Vec::new();
    let mut row_top = f64::NEG_INFINITY;
    for frag in fragments {
        if rows.is_empty() || (row_top - frag.top) > settings.y_tolerance {
            row_top = frag.top;
            rows.push(vec![frag]);
        } else {
            rows.last_mut().expect("rows is non-empty").push(frag);
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.left.partial_cmp(&b.left).unwrap_or(std::cmp::Ordering::Equal));
    }
    rows
}

/// Merge the fragments' left edges across all rows into column positions.
pub fn column_positions(rows: &[Vec<Fragment>], settings: &GeometrySettings) -> Vec<f64> {
    let mut lefts: Vec<f64> = rows.iter().flatten().map(|f| f.left).collect();
    lefts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut columns: Vec<f64> = Vec::new();
    for left in lefts {
        match columns.last() {
            Some(&last) if left - last <= settings.x_tolerance => {}
            _ => columns.push(left),
        }
    }
    columns
}

/// Place each row's fragments into the column grid.
///
/// A fragment lands in the column whose position is nearest its left
/// edge; two fragments in the same cell are joined with a space. Columns
/// with no fragment in a given row stay `None`.
pub fn grid_from_rows(rows: &[Vec<Fragment>], columns: &[f64]) -> RawTable {
    rows.iter()
        .map(|row| {
            let mut cells: RawRow = vec![None; columns.len()];
            for frag in row {
                let col = nearest_column(columns, frag.left);
                match &mut cells[col] {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&frag.text);
                    }
                    slot @ None => *slot = Some(frag.text.clone()),
                }
            }
            cells
        })
        .collect()
}

fn nearest_column(columns: &[f64], left: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &col) in columns.iter().enumerate() {
        let dist = (left - col).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Full detection for one page: fragments → rows → columns → grid.
///
/// Returns zero tables when the page does not meet the minimum grid size
/// (prose pages, cover pages), otherwise the page's single detected grid.
pub fn detect_tables(fragments: Vec<Fragment>, settings: &GeometrySettings) -> Vec<RawTable> {
    let rows = cluster_rows(fragments, settings);
    if rows.len() < settings.min_rows {
        return Vec::new();
    }
    let columns = column_positions(&rows, settings);
    if columns.len() < settings.min_cols {
        return Vec::new();
    }
    vec![grid_from_rows(&rows, &columns)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, left: f64, top: f64) -> Fragment {
        Fragment {
            text: text.to_string(),
            left,
            right: left + 8.0 * text.len() as f64,
            top,
            bottom: top - 10.0,
        }
    }

    fn chars(word: &str, left: f64, top: f64) -> Vec<CharBox> {
        word.chars()
            .enumerate()
            .map(|(i, ch)| CharBox {
                ch,
                left: left + i as f64 * 6.0,
                right: left + (i + 1) as f64 * 6.0,
                top,
                bottom: top - 10.0,
            })
            .collect()
    }

    #[test]
    fn fragments_split_on_word_gap() {
        let mut cs = chars("Consulta", 100.0, 700.0);
        cs.extend(chars("Eletiva", 200.0, 700.0)); // far to the right
        let frags = fragments_from_chars(cs, &GeometrySettings::default());
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].text, "Consulta");
        assert_eq!(frags[1].text, "Eletiva");
    }

    #[test]
    fn fragments_split_on_whitespace_and_line_break() {
        let mut cs = chars("ab", 100.0, 700.0);
        cs.push(CharBox {
            ch: '\n',
            left: 112.0,
            right: 112.0,
            top: 700.0,
            bottom: 690.0,
        });
        cs.extend(chars("cd", 100.0, 680.0)); // next line
        let frags = fragments_from_chars(cs, &GeometrySettings::default());
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].text, "ab");
        assert_eq!(frags[1].text, "cd");
        assert!(frags[0].top > frags[1].top);
    }

    #[test]
    fn rows_are_ordered_top_of_page_first() {
        // y grows upward: top=700 is visually above top=680.
        let rows = cluster_rows(
            vec![frag("lower", 100.0, 680.0), frag("upper", 100.0, 700.0)],
            &GeometrySettings::default(),
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "upper");
        assert_eq!(rows[1][0].text, "lower");
    }

    #[test]
    fn wobbly_baselines_share_a_row() {
        let rows = cluster_rows(
            vec![frag("a", 100.0, 700.0), frag("b", 200.0, 698.5)],
            &GeometrySettings::default(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        // Sorted left to right inside the row.
        assert_eq!(rows[0][0].text, "a");
    }

    #[test]
    fn column_positions_merge_within_tolerance() {
        let rows = vec![
            vec![frag("a", 100.0, 700.0), frag("b", 300.0, 700.0)],
            vec![frag("c", 101.5, 680.0), frag("d", 301.0, 680.0)],
        ];
        let cols = column_positions(&rows, &GeometrySettings::default());
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0], 100.0);
        assert_eq!(cols[1], 300.0);
    }

    #[test]
    fn grid_keeps_absent_cells_as_none() {
        let rows = vec![
            vec![frag("Código", 100.0, 700.0), frag("Procedimento", 300.0, 700.0)],
            vec![frag("10101012", 100.0, 680.0)], // second column empty
        ];
        let cols = column_positions(&rows, &GeometrySettings::default());
        let grid = grid_from_rows(&rows, &cols);
        assert_eq!(grid[0], vec![Some("Código".into()), Some("Procedimento".into())]);
        assert_eq!(grid[1], vec![Some("10101012".into()), None]);
    }

    #[test]
    fn same_cell_fragments_join_with_a_space() {
        let rows = vec![
            vec![frag("x", 100.0, 700.0), frag("y", 300.0, 700.0)],
            vec![
                frag("Consulta", 300.0, 680.0),
                frag("eletiva", 302.0, 680.0),
                frag("1", 100.0, 680.0),
            ],
        ];
        let cols = column_positions(&rows, &GeometrySettings::default());
        let grid = grid_from_rows(&rows, &cols);
        assert_eq!(grid[1][1].as_deref(), Some("Consulta eletiva"));
    }

    #[test]
    fn prose_pages_yield_no_table() {
        // Single column of text: below min_cols.
        let frags = vec![frag("parágrafo", 100.0, 700.0), frag("texto", 100.5, 680.0)];
        assert!(detect_tables(frags, &GeometrySettings::default()).is_empty());

        // Single row: below min_rows.
        let frags = vec![frag("a", 100.0, 700.0), frag("b", 300.0, 700.0)];
        assert!(detect_tables(frags, &GeometrySettings::default()).is_empty());
    }

    #[test]
    fn detect_tables_builds_the_full_grid() {
        let frags = vec![
            frag("Código", 100.0, 700.0),
            frag("Procedimento", 300.0, 700.0),
            frag("10101012", 100.0, 680.0),
            frag("Consulta", 300.0, 680.0),
        ];
        let tables = detect_tables(frags, &GeometrySettings::default());
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[0][1][0].as_deref(), Some("10101012"));
    }
}
