//! CLI binary for the fetch pipeline.
//!
//! Downloads the two ANS annex PDFs into `downloads/` and archives the
//! directory as `downloads.zip`. Each download is independent: a failed
//! URL is reported and the run continues with the next one.

use anyhow::{Context, Result};
use clap::Parser;
use rol2csv::fetch::{self, ANEXO_DOWNLOADS, DOWNLOAD_ARCHIVE, DOWNLOAD_DIR};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download both annexes and create downloads.zip
  fetch-anexos

  # Verbose transfer logging
  fetch-anexos --verbose

FILES PRODUCED:
  downloads/anexo 1.pdf   Anexo I  (Rol de Procedimentos)
  downloads/anexo 2.pdf   Anexo II (Diretrizes de Utilização)
  downloads.zip           Archive of the downloads directory
"#;

/// Download the ANS Rol de Procedimentos annexes.
#[derive(Parser, Debug)]
#[command(
    name = "fetch-anexos",
    version,
    about = "Baixa os anexos do Rol de Procedimentos da ANS e gera o downloads.zip",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTTP download timeout in seconds.
    #[arg(long, env = "ROL2CSV_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ROL2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ROL2CSV_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let dest_dir = PathBuf::from(DOWNLOAD_DIR);
    // The directory exists even when every download fails, so the archive
    // step below always has something to work on.
    tokio::fs::create_dir_all(&dest_dir)
        .await
        .with_context(|| format!("Falha ao criar o diretório '{DOWNLOAD_DIR}'"))?;

    let client = fetch::build_client(cli.download_timeout)?;
    let results = fetch::fetch_all(&client, &ANEXO_DOWNLOADS, &dest_dir, cli.download_timeout).await;

    for result in &results {
        match result {
            Ok(path) => {
                if !cli.quiet {
                    println!("Download concluído: {}", path.display());
                }
            }
            Err(e) => println!("Erro ao baixar o PDF: {e}"),
        }
    }

    fetch::archive_directory(&dest_dir, Path::new(DOWNLOAD_ARCHIVE))
        .await
        .context("Falha ao criar o arquivo ZIP")?;
    if !cli.quiet {
        println!("Arquivo ZIP criado: {DOWNLOAD_ARCHIVE}");
    }

    Ok(())
}
