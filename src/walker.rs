use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::AppError;
use crate::formats;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Canonicalizes `directory` and checks that it can be listed.
pub fn open_source_directory(directory: &Path) -> Result<PathBuf, AppError> {
    let root = fs::canonicalize(directory)?;
    if !root.is_dir() {
        return Err(AppError::NotADirectory(root));
    }
    fs::read_dir(&root)?;
    Ok(root)
}

/// Lists the supported image files directly inside `root`, sorted by name.
pub fn list_candidates(root: &Path, sink: &mut dyn DiagnosticSink) -> Vec<PathBuf> {
    log::info!("Starting file discovery in {:?}", root);

    let mut candidates = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                sink.report(Diagnostic::new(&path, AppError::from(e)));
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() {
            log::trace!("Skipping non-file entry: {:?}", path);
            continue;
        }
        log::trace!("Discovered file: {:?}", path);

        let name = entry.file_name().to_string_lossy();
        if formats::is_supported(&name) {
            log::debug!("Queueing image file: {:?}", path);
            candidates.push(path.to_path_buf());
        } else {
            log::trace!("Skipping file due to unsupported extension: {:?}", path);
        }
    }

    log::info!("File discovery complete, {} candidate(s).", candidates.len());
    candidates
}
