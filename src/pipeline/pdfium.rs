//! The production [`TableSource`] backed by pdfium.
//!
//! pdfium is bound dynamically at runtime: an explicit
//! `PDFIUM_DYNAMIC_LIB_PATH` wins, then a copy next to the working
//! directory, then the system library path. Binding is attempted once,
//! when the document is opened — not per page.
//!
//! Per page, the backend reads every character's unicode value and loose
//! bounding box and hands them to [`crate::pipeline::geometry`], which
//! reconstructs the grid. No rasterisation happens anywhere.

use crate::error::RolError;
use crate::pipeline::extract::TableSource;
use crate::pipeline::geometry::{self, CharBox, GeometrySettings};
use crate::table::RawTable;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Bind to a pdfium library, trying the env override, the working
/// directory, then the system path.
pub fn init_pdfium() -> Result<Pdfium, RolError> {
    if let Ok(lib_path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        return Pdfium::bind_to_library(&lib_path)
            .map(Pdfium::new)
            .map_err(|e| RolError::PdfiumBindingFailed(format!("{e:?} (from {lib_path})")));
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| RolError::PdfiumBindingFailed(format!("{e:?}")))
}

/// A loaded PDF document exposing detected tables per page.
pub struct PdfiumTableSource<'a> {
    document: PdfDocument<'a>,
    settings: GeometrySettings,
}

impl<'a> PdfiumTableSource<'a> {
    /// Open `path` with default geometry tolerances.
    pub fn open(pdfium: &'a Pdfium, path: &Path) -> Result<Self, RolError> {
        Self::open_with_settings(pdfium, path, GeometrySettings::default())
    }

    pub fn open_with_settings(
        pdfium: &'a Pdfium,
        path: &Path,
        settings: GeometrySettings,
    ) -> Result<Self, RolError> {
        let document =
            pdfium
                .load_pdf_from_file(path, None)
                .map_err(|e| RolError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: format!("{e:?}"),
                })?;
        debug!(
            "Opened {} ({} pages)",
            path.display(),
            document.pages().len()
        );
        Ok(Self { document, settings })
    }
}

impl TableSource for PdfiumTableSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn tables_on_page(&self, page_index: usize) -> Result<Vec<RawTable>, RolError> {
        let pages = self.document.pages();
        let page = pages
            .get(page_index as u16)
            .map_err(|e| RolError::PageExtractionFailed {
                page: page_index + 1,
                detail: format!("{e:?}"),
            })?;

        let text = page.text().map_err(|e| RolError::PageExtractionFailed {
            page: page_index + 1,
            detail: format!("{e:?}"),
        })?;

        let mut chars: Vec<CharBox> = Vec::new();
        for ch in text.chars().iter() {
            let Some(unicode) = ch.unicode_char() else {
                continue;
            };
            let Ok(bounds) = ch.loose_bounds() else {
                continue;
            };
            chars.push(CharBox {
                ch: unicode,
                left: bounds.left.value as f64,
                right: bounds.right.value as f64,
                top: bounds.top.value as f64,
                bottom: bounds.bottom.value as f64,
            });
        }

        let fragments = geometry::fragments_from_chars(chars, &self.settings);
        Ok(geometry::detect_tables(fragments, &self.settings))
    }
}
