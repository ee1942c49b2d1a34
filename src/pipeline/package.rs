//! Output packaging: timestamped CSV wrapped in the fixed-name archive.
//!
//! The CSV carries a UTF-8 byte-order mark so Excel and LibreOffice open
//! the accented Portuguese text correctly without an import dialog. Rows
//! are padded to the table's widest row at serialization time only — the
//! in-memory table stays ragged.

use crate::config::ExtractionConfig;
use crate::error::RolError;
use crate::table::ProcedureTable;
use chrono::{DateTime, Local};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// UTF-8 byte-order mark, for spreadsheet compatibility.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Second-resolution timestamped file name: `{prefix}_YYYYMMDD_HHMMSS.csv`.
pub fn csv_filename(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// Write the table as a BOM-prefixed CSV. No index column is emitted.
pub fn write_csv(table: &ProcedureTable, path: &Path) -> Result<(), RolError> {
    let io_err = |e: std::io::Error| RolError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let csv_err = |e: csv::Error| RolError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: std::io::Error::other(e),
    };

    let mut file = std::fs::File::create(path).map_err(io_err)?;
    file.write_all(BOM).map_err(io_err)?;

    let width = table.width();
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(padded(&table.labels(), width))
        .map_err(csv_err)?;
    for row in &table.rows {
        writer.write_record(padded(row, width)).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Pad a row with empty fields up to `width`.
fn padded(row: &[String], width: usize) -> Vec<&str> {
    let mut fields: Vec<&str> = row.iter().map(String::as_str).collect();
    fields.resize(width, "");
    fields
}

/// Wrap a single file in a deflate ZIP, truncating any existing archive.
pub fn archive_csv(csv_path: &Path, zip_path: &Path) -> Result<(), RolError> {
    let entry_name = csv_path
        .file_name()
        .ok_or_else(|| RolError::Internal(format!("No file name in {}", csv_path.display())))?
        .to_string_lossy()
        .into_owned();

    let archive_err = |detail: String| RolError::ArchiveFailed {
        path: zip_path.to_path_buf(),
        detail,
    };

    let file = std::fs::File::create(zip_path).map_err(|e| RolError::OutputWriteFailed {
        path: zip_path.to_path_buf(),
        source: e,
    })?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(entry_name, options)
        .map_err(|e| archive_err(e.to_string()))?;
    let bytes = std::fs::read(csv_path).map_err(|e| archive_err(e.to_string()))?;
    zip.write_all(&bytes).map_err(|e| archive_err(e.to_string()))?;
    zip.finish().map_err(|e| archive_err(e.to_string()))?;

    info!("Wrote archive {}", zip_path.display());
    Ok(())
}

/// Produce both artifacts: the timestamped CSV and the fixed-name archive.
///
/// Returns `(csv_path, zip_path)` for reporting.
pub fn package(
    table: &ProcedureTable,
    config: &ExtractionConfig,
) -> Result<(PathBuf, PathBuf), RolError> {
    std::fs::create_dir_all(&config.output_dir).map_err(|e| RolError::OutputWriteFailed {
        path: config.output_dir.clone(),
        source: e,
    })?;

    let csv_path = config
        .output_dir
        .join(csv_filename(&config.csv_prefix, Local::now()));
    write_csv(table, &csv_path)?;

    let zip_path = config.output_dir.join(&config.archive_name);
    archive_csv(&csv_path, &zip_path)?;

    Ok((csv_path, zip_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use std::io::Read as _;

    fn sample() -> ProcedureTable {
        ProcedureTable {
            columns: Some(vec!["Código".into(), "Procedimento".into()]),
            rows: vec![
                vec!["1".into(), "Consulta Odontológico".into()],
                vec!["2".into(), "Exame Ambulatorial".into()],
            ],
        }
    }

    #[test]
    fn csv_filename_has_second_resolution() {
        let now = Local.with_ymd_and_hms(2026, 8, 5, 14, 30, 7).unwrap();
        assert_eq!(
            csv_filename("procedimentos_saude", now),
            "procedimentos_saude_20260805_143007.csv"
        );
    }

    #[test]
    fn csv_starts_with_bom_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        write_csv(&sample(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], BOM);

        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["Código", "Procedimento"]);
        assert_eq!(reader.records().count(), 2);
    }

    #[test]
    fn ragged_rows_are_padded_only_in_the_csv() {
        let table = ProcedureTable {
            columns: Some(vec!["Código".into(), "Procedimento".into()]),
            rows: vec![vec!["1".into()], vec!["2".into(), "x".into(), "extra".into()]],
        };
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.csv");
        write_csv(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let mut reader = csv::Reader::from_reader(&bytes[3..]);
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records[0].len(), 3);
        assert_eq!(records[0].get(1), Some(""));
        assert_eq!(records[1].get(2), Some("extra"));
    }

    #[test]
    fn archive_holds_exactly_the_one_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ExtractionConfig::builder()
            .output_dir(tmp.path())
            .build()
            .unwrap();

        let (csv_path, zip_path) = package(&sample(), &config).unwrap();
        assert!(csv_path.exists());
        assert_eq!(zip_path, tmp.path().join("Teste_Laura.zip"));

        let file = std::fs::File::open(&zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);

        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(
            entry.name(),
            csv_path.file_name().unwrap().to_string_lossy()
        );
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        assert_eq!(content, std::fs::read(&csv_path).unwrap());
    }

    #[test]
    fn repackaging_overwrites_the_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("Teste_Laura.zip");
        std::fs::write(&zip_path, b"stale bytes that are not a zip").unwrap();

        let csv_path = tmp.path().join("data.csv");
        write_csv(&sample(), &csv_path).unwrap();
        archive_csv(&csv_path, &zip_path).unwrap();

        let file = std::fs::File::open(&zip_path).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
    }
}
