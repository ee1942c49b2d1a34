//! Configuration types for the extraction pipeline.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. The defaults reproduce the
//! values the ANS annex actually requires (page window 3–181, the
//! "Código"/"Procedimento" header keywords, the OD/AMB legend), so most
//! callers never touch the builder at all.
//!
//! The abbreviation legend lives here — as an explicit immutable value
//! handed to the normalizer — rather than as module-level state.

use crate::error::RolError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use rol2csv::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .page_window(2, 180)
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.progress_every, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// First page of the extraction window, 0-indexed. Default: 2 (page 3).
    ///
    /// The annex opens with a cover page and a legend page; the procedure
    /// table starts on the third physical page.
    pub window_start: usize,

    /// Last page of the extraction window, 0-indexed, inclusive. Default: 180.
    ///
    /// Clamped at run time to the document's actual last page; a shorter
    /// document produces a warning, never an error.
    pub window_end: usize,

    /// Keywords that identify the header row. Default: "Código", "Procedimento".
    ///
    /// The first cleaned row on the window's first page containing any of
    /// these as a substring of any cell becomes the column-name sequence
    /// for the whole output.
    pub header_keywords: Vec<String>,

    /// Abbreviation legend applied to every named textual column, in order.
    /// Default: `OD → Odontológico`, `AMB → Ambulatorial`.
    ///
    /// Each `(code, description)` pair is one independent whole-word,
    /// case-sensitive pass; a later code never rescans an earlier code's
    /// replacement text.
    pub abbreviations: Vec<(String, String)>,

    /// Report progress every N pages of the window. Default: 10.
    pub progress_every: usize,

    /// Directory the CSV and archive are written to. Default: `.`.
    pub output_dir: PathBuf,

    /// Prefix of the timestamped CSV file name. Default: `procedimentos_saude`.
    pub csv_prefix: String,

    /// Fixed name of the output archive. Default: `Teste_Laura.zip`.
    ///
    /// A pre-existing archive of this name is overwritten.
    pub archive_name: String,

    /// HTTP timeout for annex downloads in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            window_start: 2,
            window_end: 180,
            header_keywords: vec!["Código".to_string(), "Procedimento".to_string()],
            abbreviations: vec![
                ("OD".to_string(), "Odontológico".to_string()),
                ("AMB".to_string(), "Ambulatorial".to_string()),
            ],
            progress_every: 10,
            output_dir: PathBuf::from("."),
            csv_prefix: "procedimentos_saude".to_string(),
            archive_name: "Teste_Laura.zip".to_string(),
            download_timeout_secs: 120,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The window as 1-indexed page numbers, for human-facing messages.
    pub fn window_pages(&self) -> (usize, usize) {
        (self.window_start + 1, self.window_end + 1)
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Set the 0-indexed, inclusive page window.
    pub fn page_window(mut self, start: usize, end: usize) -> Self {
        self.config.window_start = start;
        self.config.window_end = end;
        self
    }

    pub fn header_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.header_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn abbreviations<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.config.abbreviations = pairs
            .into_iter()
            .map(|(code, desc)| (code.into(), desc.into()))
            .collect();
        self
    }

    pub fn progress_every(mut self, n: usize) -> Self {
        self.config.progress_every = n.max(1);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn csv_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.csv_prefix = prefix.into();
        self
    }

    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.archive_name = name.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, RolError> {
        let c = &self.config;
        if c.window_start > c.window_end {
            return Err(RolError::InvalidConfig(format!(
                "Page window start {} is after end {}",
                c.window_start, c.window_end
            )));
        }
        if c.csv_prefix.is_empty() {
            return Err(RolError::InvalidConfig("CSV prefix must not be empty".into()));
        }
        if c.archive_name.is_empty() {
            return Err(RolError::InvalidConfig(
                "Archive name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_annex_literals() {
        let c = ExtractionConfig::default();
        assert_eq!((c.window_start, c.window_end), (2, 180));
        assert_eq!(c.window_pages(), (3, 181));
        assert_eq!(c.header_keywords, vec!["Código", "Procedimento"]);
        assert_eq!(c.abbreviations.len(), 2);
        assert_eq!(c.abbreviations[0].0, "OD");
        assert_eq!(c.archive_name, "Teste_Laura.zip");
    }

    #[test]
    fn builder_rejects_inverted_window() {
        let err = ExtractionConfig::builder().page_window(10, 2).build();
        assert!(matches!(err, Err(RolError::InvalidConfig(_))));
    }

    #[test]
    fn builder_rejects_empty_prefix() {
        let err = ExtractionConfig::builder().csv_prefix("").build();
        assert!(matches!(err, Err(RolError::InvalidConfig(_))));
    }

    #[test]
    fn progress_every_is_clamped_to_one() {
        let c = ExtractionConfig::builder().progress_every(0).build().unwrap();
        assert_eq!(c.progress_every, 1);
    }
}
