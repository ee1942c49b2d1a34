//! Error types for the rol2csv library.
//!
//! A single fatal error enum covers both pipelines. Downloads are the one
//! place where a failure is tolerated mid-run: [`crate::fetch::fetch_all`]
//! catches [`RolError`] per item and keeps going, because each annex
//! download is independent. Everywhere else an error aborts the stage that
//! produced it — extraction deliberately produces no partial output.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the rol2csv library.
#[derive(Debug, Error)]
pub enum RolError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Download errors ───────────────────────────────────────────────────
    /// HTTP transport failure or non-success status while fetching a URL.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' could not be opened: {detail}\nCheck the file is a valid, unprotected PDF.")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error while reading text from a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageExtractionFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium (e.g. from bblanchon/pdfium-binaries) next to the\n\
executable or into a system library path, or point PDFIUM_DYNAMIC_LIB_PATH\n\
at an existing copy."
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (CSV or downloaded PDF).
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// ZIP archive creation failed.
    #[error("Failed to create archive '{path}': {detail}")]
    ArchiveFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_failed_display() {
        let e = RolError::DownloadFailed {
            url: "https://example.com/anexo.pdf".into(),
            reason: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("anexo.pdf"), "got: {msg}");
        assert!(msg.contains("HTTP 503"), "got: {msg}");
    }

    #[test]
    fn page_extraction_display() {
        let e = RolError::PageExtractionFailed {
            page: 17,
            detail: "bad stream".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 17"));
        assert!(msg.contains("bad stream"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = RolError::OutputWriteFailed {
            path: PathBuf::from("/tmp/out.csv"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("out.csv"));
    }
}
