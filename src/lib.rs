//! # rol2csv
//!
//! Download the ANS "Rol de Procedimentos" annexes and extract the
//! procedure table to a spreadsheet-ready CSV.
//!
//! ## Why this crate?
//!
//! The annex is published as a ~180-page PDF whose payload is one long
//! table. Generic PDF-to-text tools flatten that table into unusable
//! prose. This crate reconstructs the grid from character geometry,
//! detects the header row, strips the page furniture, expands the OD/AMB
//! coverage legend, and writes a CSV that opens cleanly in Excel.
//!
//! ## Pipeline Overview
//!
//! ```text
//! fetch-anexos                     rol2csv
//!  │                                │
//!  ├─ download two annex PDFs       ├─ 1. Locate    find "anexo 1.pdf"
//!  │  (streamed writes)             ├─ 2. Extract   pages 3–181 → raw rows
//!  └─ archive downloads/ as ZIP     ├─ 3. Normalize dedup, digit filter,
//!                                   │               legend substitution
//!                                   └─ 4. Package   BOM CSV + Teste_Laura.zip
//! ```
//!
//! The two pipelines are independent; they only meet on the filesystem
//! (`fetch-anexos` drops the file that `rol2csv` later locates).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rol2csv::{extract_tables, normalize, substitute, package};
//! use rol2csv::{ExtractionConfig, NoopProgress};
//! use rol2csv::pipeline::pdfium::{init_pdfium, PdfiumTableSource};
//!
//! fn main() -> Result<(), rol2csv::RolError> {
//!     let config = ExtractionConfig::default();
//!     let pdfium = init_pdfium()?;
//!     let source = PdfiumTableSource::open(&pdfium, "anexo 1.pdf".as_ref())?;
//!
//!     let output = extract_tables(&source, &config, &NoopProgress)?;
//!     let table = substitute(normalize(output.table), &config.abbreviations)?;
//!     let (csv_path, zip_path) = package(&table, &config)?;
//!     println!("{} / {}", csv_path.display(), zip_path.display());
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod progress;
pub mod table;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::RolError;
pub use pipeline::extract::{extract_tables, ExtractionOutput, TableSource};
pub use pipeline::locate::{candidate_dirs, locate_in, locate_or_prompt};
pub use pipeline::normalize::{normalize, substitute};
pub use pipeline::package::package;
pub use progress::{ExtractionProgress, NoopProgress};
pub use table::{leads_with_digit, ProcedureTable, RawRow, RawTable};
