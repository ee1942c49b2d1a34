//! Annex download and archive: the fetch pipeline.
//!
//! ## Why streamed writes?
//!
//! The annexes are multi-megabyte PDFs served by a government portal.
//! Streaming the response body to disk in chunks keeps peak memory flat
//! regardless of file size. A failed transfer leaves the partial file in
//! place — there is no rollback, matching the archival intent of keeping
//! whatever was received.
//!
//! Each download is independent: [`fetch_all`] logs a failure and moves
//! on to the next URL rather than aborting the run.

use crate::error::RolError;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// The two annex downloads: `(url, local filename)`.
pub const ANEXO_DOWNLOADS: [(&str, &str); 2] = [
    (
        "https://www.gov.br/ans/pt-br/acesso-a-informacao/participacao-da-sociedade/atualizacao-do-rol-de-procedimentos/Anexo_I_Rol_2021RN_465.2021_RN627L.2024.pdf",
        "anexo 1.pdf",
    ),
    (
        "https://www.gov.br/ans/pt-br/acesso-a-informacao/participacao-da-sociedade/atualizacao-do-rol-de-procedimentos/Anexo_II_DUT_2021_RN_465.2021_RN628.2025_RN629.2025.pdf",
        "anexo 2.pdf",
    ),
];

/// Directory the fetch pipeline writes into, relative to the working dir.
pub const DOWNLOAD_DIR: &str = "downloads";

/// Name of the archive produced from [`DOWNLOAD_DIR`].
pub const DOWNLOAD_ARCHIVE: &str = "downloads.zip";

/// Build the HTTP client used for annex downloads.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, RolError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RolError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Download one URL to `dest` with chunked writes. Returns bytes written.
///
/// Creates the destination's parent directory if absent. On transport or
/// HTTP-status failure the partially written file is left on disk.
/// `timeout_secs` only labels the timeout error; the enforcement lives in
/// the client built by [`build_client`].
pub async fn download_pdf(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    timeout_secs: u64,
) -> Result<u64, RolError> {
    info!("Downloading {} -> {}", url, dest.display());

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            RolError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            RolError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(RolError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RolError::OutputWriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let mut file =
        tokio::fs::File::create(dest)
            .await
            .map_err(|e| RolError::OutputWriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RolError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| RolError::OutputWriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| RolError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

    debug!("Wrote {} bytes to {}", written, dest.display());
    Ok(written)
}

/// Download every `(url, filename)` pair into `dest_dir`, one at a time.
///
/// A failed item is logged and recorded as `Err`; the remaining items are
/// still attempted, so one dead URL never blocks the other annex.
pub async fn fetch_all(
    client: &reqwest::Client,
    downloads: &[(&str, &str)],
    dest_dir: &Path,
    timeout_secs: u64,
) -> Vec<Result<PathBuf, RolError>> {
    let mut results = Vec::with_capacity(downloads.len());
    for (url, filename) in downloads {
        let dest = dest_dir.join(filename);
        match download_pdf(client, url, &dest, timeout_secs).await {
            Ok(bytes) => {
                info!("Download complete: {} ({} bytes)", dest.display(), bytes);
                results.push(Ok(dest));
            }
            Err(e) => {
                warn!("Download failed for {url}: {e}");
                results.push(Err(e));
            }
        }
    }
    results
}

/// Archive the full contents of `dir` into `zip_path` (deflate).
///
/// One-shot and non-incremental: any existing archive at `zip_path` is
/// truncated. Entry names are relative to `dir`, so the archive unpacks
/// to the directory's contents, not to a wrapping folder.
pub async fn archive_directory(dir: &Path, zip_path: &Path) -> Result<(), RolError> {
    let dir = dir.to_path_buf();
    let zip_path = zip_path.to_path_buf();
    // zip writing is synchronous; keep it off the async runtime the same
    // way the pdfium work is kept off it.
    tokio::task::spawn_blocking(move || archive_directory_blocking(&dir, &zip_path))
        .await
        .map_err(|e| RolError::Internal(format!("Archive task panicked: {e}")))?
}

fn archive_directory_blocking(dir: &Path, zip_path: &Path) -> Result<(), RolError> {
    let file = std::fs::File::create(zip_path).map_err(|e| RolError::OutputWriteFailed {
        path: zip_path.to_path_buf(),
        source: e,
    })?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    add_dir_entries(&mut zip, dir, dir, options).map_err(|e| RolError::ArchiveFailed {
        path: zip_path.to_path_buf(),
        detail: e.to_string(),
    })?;

    zip.finish().map_err(|e| RolError::ArchiveFailed {
        path: zip_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    Ok(())
}

fn add_dir_entries(
    zip: &mut zip::ZipWriter<std::fs::File>,
    root: &Path,
    dir: &Path,
    options: zip::write::SimpleFileOptions,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path
            .strip_prefix(root)?
            .to_string_lossy()
            .replace('\\', "/");
        if path.is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
            add_dir_entries(zip, root, &path, options)?;
        } else {
            zip.start_file(name, options)?;
            let bytes = std::fs::read(&path)?;
            use std::io::Write as _;
            zip.write_all(&bytes)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[tokio::test]
    async fn archive_contains_directory_contents_relative_to_root() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("downloads");
        std::fs::create_dir_all(data_dir.join("sub")).unwrap();
        std::fs::write(data_dir.join("anexo 1.pdf"), b"%PDF-1.7 one").unwrap();
        std::fs::write(data_dir.join("sub/nested.txt"), b"nested").unwrap();

        let zip_path = tmp.path().join("downloads.zip");
        archive_directory(&data_dir, &zip_path).await.unwrap();

        let file = std::fs::File::open(&zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"anexo 1.pdf".to_string()), "got: {names:?}");
        assert!(names.contains(&"sub/nested.txt".to_string()), "got: {names:?}");

        let mut content = String::new();
        archive
            .by_name("anexo 1.pdf")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "%PDF-1.7 one");
    }

    #[tokio::test]
    async fn archive_overwrites_previous_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("downloads");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("a.txt"), b"first").unwrap();

        let zip_path = tmp.path().join("downloads.zip");
        archive_directory(&data_dir, &zip_path).await.unwrap();

        std::fs::remove_file(data_dir.join("a.txt")).unwrap();
        std::fs::write(data_dir.join("b.txt"), b"second").unwrap();
        archive_directory(&data_dir, &zip_path).await.unwrap();

        let file = std::fs::File::open(&zip_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), "b.txt");
    }

    #[tokio::test]
    async fn download_failure_reports_url() {
        let client = build_client(5).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        // Port 1 is never listening; the connection is refused immediately.
        let err = download_pdf(
            &client,
            "http://127.0.0.1:1/anexo.pdf",
            &tmp.path().join("x.pdf"),
            5,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("127.0.0.1"), "got: {err}");
    }
}
