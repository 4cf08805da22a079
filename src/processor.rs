use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::AppError;
use crate::metadata::{MetadataDirectory, PictureRecord};
use crate::reader::MetadataReader;
use crate::resolver;
use crate::walker;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// What happened to a single candidate file.
#[derive(Debug)]
pub enum FileOutcome {
    Record(PictureRecord),
    Skip,
    Fail(AppError),
}

/// Extracts a [`PictureRecord`] for every supported image directly inside
/// `directory` that carries a camera identity.
///
/// Per-file failures go to `sink` and never abort the scan. The only
/// error returned is for a source directory that cannot be read.
pub fn extract(
    directory: &Path,
    reader: &dyn MetadataReader,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<PictureRecord>, AppError> {
    let root = walker::open_source_directory(directory)?;
    let paths = walker::list_candidates(&root, sink);
    log::info!("Extracting camera metadata from {} file(s)", paths.len());

    let outcomes = paths.into_iter().map(|path| {
        let outcome = process_image(reader, &path);
        (path, outcome)
    });
    let records = fold_outcomes(outcomes, sink);

    log::info!("Extraction finished with {} record(s).", records.len());
    Ok(records)
}

/// Collects records in order, reporting each failure once.
pub fn fold_outcomes<I>(outcomes: I, sink: &mut dyn DiagnosticSink) -> Vec<PictureRecord>
where
    I: IntoIterator<Item = (PathBuf, FileOutcome)>,
{
    let mut records = Vec::new();
    for (path, outcome) in outcomes {
        match outcome {
            FileOutcome::Record(record) => {
                log::trace!("Extracted metadata for {:?}: {:?}", path, record);
                records.push(record);
            }
            FileOutcome::Skip => log::debug!("No camera identity in {:?}, skipping", path),
            FileOutcome::Fail(e) => sink.report(Diagnostic::new(&path, e)),
        }
    }
    records
}

fn process_image(reader: &dyn MetadataReader, path: &Path) -> FileOutcome {
    log::debug!("Processing image: {:?}", path);
    let directories = match read_directories(reader, path) {
        Ok(directories) => directories,
        Err(e) => return FileOutcome::Fail(e),
    };

    match resolver::resolve(&directories) {
        Some(identity) if !identity.is_empty() => {
            FileOutcome::Record(PictureRecord::new(path.to_path_buf(), identity))
        }
        _ => FileOutcome::Skip,
    }
}

fn read_directories(
    reader: &dyn MetadataReader,
    path: &Path,
) -> Result<Vec<MetadataDirectory>, AppError> {
    let file = File::open(path)?;
    let mut stream = BufReader::new(file);
    reader.read_metadata(&mut stream)
}
