//! CLI binary for the extraction pipeline.
//!
//! A thin shim over the library crate: locate the annex, run extraction,
//! normalize, package, and narrate the run in the console protocol the
//! analysts already rely on. Missing file, empty result and extraction
//! errors print a diagnostic and return — they are expected end states,
//! not crashes.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rol2csv::fetch::ANEXO_DOWNLOADS;
use rol2csv::pipeline::pdfium::{init_pdfium, PdfiumTableSource};
use rol2csv::{
    extract_tables, locate_or_prompt, normalize, package, substitute, ExtractionConfig,
    ExtractionProgress, NoopProgress, RolError,
};
use std::io;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract the procedure table from a previously fetched annex
  rol2csv

  # No progress bar (plain log lines only)
  rol2csv --no-progress

SEARCH ORDER for 'anexo 1.pdf':
  1. the current directory
  2. ./downloads (where fetch-anexos saves it)
  3. ~/Downloads
  4. ~/Documents
If the file is in none of these, a path prompt is shown.

FILES PRODUCED:
  procedimentos_saude_YYYYMMDD_HHMMSS.csv
  Teste_Laura.zip
"#;

/// Extract the ANS procedure table to CSV.
#[derive(Parser, Debug)]
#[command(
    name = "rol2csv",
    version,
    about = "Extrai a tabela de procedimentos do Anexo I para CSV",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Disable the progress bar.
    #[arg(long, env = "ROL2CSV_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ROL2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ROL2CSV_QUIET")]
    quiet: bool,
}

// ── CLI progress: Portuguese status lines + a page bar ───────────────────────

struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("[{bar:40.green/238}] {pos:>3}/{len} páginas")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }
}

impl ExtractionProgress for CliProgress {
    fn on_clamped(&self, total_pages: usize) {
        // The bar is still hidden here; print directly.
        println!("Aviso: O PDF tem apenas {total_pages} páginas. Ajustando extração.");
    }

    fn on_start(&self, first_page: usize, last_page: usize) {
        println!("\nExtraindo dados das páginas {first_page} a {last_page}...");
        self.bar.set_length((last_page - first_page + 1) as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_pages(&self, done: usize, total: usize) {
        self.bar.set_position(done as u64);
        self.bar.println(format!("Progresso: {done}/{total} páginas"));
    }

    fn on_complete(&self, _rows: usize) {
        self.bar.finish_and_clear();
    }
}

/// Plain-line progress for `--no-progress` runs.
struct PlainProgress;

impl ExtractionProgress for PlainProgress {
    fn on_clamped(&self, total_pages: usize) {
        println!("Aviso: O PDF tem apenas {total_pages} páginas. Ajustando extração.");
    }

    fn on_start(&self, first_page: usize, last_page: usize) {
        println!("\nExtraindo dados das páginas {first_page} a {last_page}...");
    }

    fn on_pages(&self, done: usize, total: usize) {
        println!("Progresso: {done}/{total} páginas");
    }
}

fn main() -> Result<()> {
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

    if !cli.quiet {
        println!("=== Extração e Tratamento de Dados de Saúde ===");
    }

    let config = ExtractionConfig::default();
    let annex_name = ANEXO_DOWNLOADS[0].1;

    // ── Locate ───────────────────────────────────────────────────────────
    let pdf_path = locate_or_prompt(annex_name).context("Falha ao ler o caminho do arquivo")?;
    if !rol2csv::pipeline::locate::is_readable_file(&pdf_path) {
        println!("\nErro: Arquivo não encontrado - {}", pdf_path.display());
        return Ok(());
    }
    if !cli.quiet {
        println!("\nArquivo encontrado: {}", pdf_path.display());
    }

    // ── Extract ──────────────────────────────────────────────────────────
    let progress: Box<dyn ExtractionProgress> = if cli.quiet {
        Box::new(NoopProgress)
    } else if cli.no_progress {
        Box::new(PlainProgress)
    } else {
        Box::new(CliProgress::new())
    };

    let output = match run_extraction(&pdf_path, &config, progress.as_ref()) {
        Ok(output) => output,
        Err(e) => {
            println!("\nErro na extração: {e}");
            return Ok(());
        }
    };

    // ── Normalize ────────────────────────────────────────────────────────
    let table = normalize(output.table);
    if table.is_empty() {
        let (first, last) = config.window_pages();
        println!("\nNenhum dado foi extraído. Verifique:");
        println!("- Se o PDF contém a tabela nas páginas {first}-{last}");
        println!("- Se o PDF não está protegido ou corrompido");
        return Ok(());
    }

    if !cli.quiet {
        println!("\nSubstituindo abreviações pelas descrições completas...");
    }
    let table = substitute(table, &config.abbreviations)?;

    // ── Package ──────────────────────────────────────────────────────────
    let (csv_path, zip_path) = package(&table, &config)?;
    if cli.quiet {
        return Ok(());
    }
    println!("\nArquivo CSV criado: {}", csv_path.display());
    println!("Arquivo ZIP criado: {}", zip_path.display());

    // ── Summary ──────────────────────────────────────────────────────────
    let codes: Vec<&str> = config
        .abbreviations
        .iter()
        .map(|(code, _)| code.as_str())
        .collect();

    println!("\n{}", "=".repeat(50));
    println!("✅ Processo concluído com sucesso!");
    println!(
        "📄 Arquivo PDF processado: {}",
        pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf_path.display().to_string())
    );
    println!("📊 Total de registros extraídos: {}", thousands(table.len()));
    println!("🔄 Abreviações substituídas: {}", codes.join(", "));
    println!("📁 Arquivo CSV gerado: {}", csv_path.display());
    println!("🗜 Arquivo ZIP criado: {}", zip_path.display());

    println!("\nAmostra dos dados com as substituições (3 primeiras linhas):");
    println!("{}", table.labels().join(" | "));
    for row in table.rows.iter().take(3) {
        println!("{}", row.join(" | "));
    }

    println!("\nLegenda aplicada:");
    for (code, description) in &config.abbreviations {
        println!("- {code} = {description}");
    }

    println!(
        "- Envie o arquivo '{}' para Laura",
        zip_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| zip_path.display().to_string())
    );
    println!("- O CSV dentro do ZIP já está pronto para análise");

    Ok(())
}

/// Bind pdfium, open the annex and walk the page window.
fn run_extraction(
    pdf_path: &std::path::Path,
    config: &ExtractionConfig,
    progress: &dyn ExtractionProgress,
) -> Result<rol2csv::ExtractionOutput, RolError> {
    let pdfium = init_pdfium()?;
    let source = PdfiumTableSource::open(&pdfium, pdf_path)?;
    extract_tables(&source, config, progress)
}

/// Format a count with thousands separators (`1234567` → `1,234,567`).
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
