//! Input location: find the annex PDF across the usual directories.
//!
//! The candidate order encodes a real deployment assumption: the working
//! directory (where `fetch-anexos` runs) and its `downloads/` subdirectory
//! come before the user's home folders, so a freshly fetched annex always
//! wins over a stale copy in `~/Downloads`. Do not reorder.

use crate::fetch::DOWNLOAD_DIR;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The fixed candidate directories, highest priority first.
///
/// 1. the process working directory
/// 2. its `downloads/` subdirectory
/// 3. the user's `~/Downloads`
/// 4. the user's `~/Documents`
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs_list = Vec::with_capacity(4);
    if let Ok(cwd) = std::env::current_dir() {
        dirs_list.push(cwd.clone());
        dirs_list.push(cwd.join(DOWNLOAD_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join("Downloads"));
        dirs_list.push(home.join("Documents"));
    }
    dirs_list
}

/// First directory in `dirs` that contains `filename`, as a full path.
pub fn locate_in(filename: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        let candidate = dir.join(filename);
        if candidate.exists() {
            debug!("Found {} in {}", filename, dir.display());
            return Some(candidate);
        }
    }
    None
}

/// Locate `filename`, falling back to an interactive path prompt.
///
/// On a miss, every searched directory is listed on stdout and the user
/// is asked to paste (or drag in) the file path; surrounding double
/// quotes — added by shells and file managers on drag-and-drop — are
/// stripped. The returned path is *not* verified to exist here; the
/// caller performs that check before extraction.
pub fn locate_or_prompt(filename: &str) -> std::io::Result<PathBuf> {
    let dirs_list = candidate_dirs();
    if let Some(found) = locate_in(filename, &dirs_list) {
        return Ok(found);
    }

    println!("Não encontrei '{filename}' nestes locais:");
    for dir in &dirs_list {
        println!("- {}", dir.display());
    }
    println!();

    let raw: String = dialoguer::Input::new()
        .with_prompt("Cole o caminho completo do arquivo ou arraste o PDF aqui")
        .interact_text()
        .map_err(std::io::Error::other)?;
    Ok(PathBuf::from(strip_quotes(raw.trim())))
}

/// Strip one pair of surrounding double quotes, if present.
fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

/// Existence + readability check run by callers on the located path.
pub fn is_readable_file(path: &Path) -> bool {
    path.is_file()
}
