//! Pipeline stages for procedure-table extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets the PDF
//! backend be swapped (or faked in tests) without touching the window,
//! header or normalization logic.
//!
//! ## Data Flow
//!
//! ```text
//! locate ──▶ extract ──▶ normalize ──▶ package
//! (find pdf)  (pages →     (dedup,       (csv + zip)
//!              raw rows)    filter,
//!                           legend)
//! ```
//!
//! 1. [`locate`]    — find the input annex across the candidate dirs
//! 2. [`extract`]   — walk the page window, clean rows, detect the header
//! 3. [`geometry`]  — char-cluster table detection used by the pdfium backend
//! 4. [`pdfium`]    — the production [`extract::TableSource`] over pdfium
//! 5. [`normalize`] — dedup, digit admission filter, legend substitution
//! 6. [`package`]   — timestamped BOM CSV wrapped in the fixed-name archive

pub mod extract;
pub mod geometry;
pub mod locate;
pub mod normalize;
pub mod package;
pub mod pdfium;
