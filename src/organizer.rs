use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::AppError;
use crate::metadata::PictureRecord;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Maker,
    Model,
}

impl GroupBy {
    fn select<'a>(&self, record: &'a PictureRecord) -> Option<&'a str> {
        match self {
            GroupBy::Maker => record.maker.as_deref(),
            GroupBy::Model => record.model.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrganizeOptions {
    pub group_by: GroupBy,
    pub dry_run: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrganizeSummary {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Normalizes a maker or model into a destination folder name.
///
/// The result must be a single ordinary path component so a copy can
/// never land outside the destination root.
pub fn group_key(value: &str) -> Result<String, AppError> {
    let key = value.to_lowercase();
    let mut components = Path::new(&key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !has_separator(&key) => Ok(key),
        _ => Err(AppError::InvalidGroupKey(value.to_string())),
    }
}

fn has_separator(key: &str) -> bool {
    if cfg!(windows) {
        key.contains(['/', '\\'])
    } else {
        key.contains('/')
    }
}

/// Copies every record into `destination/<group key>/<file name>`.
///
/// Records without the selected field are skipped. Failures are reported
/// to `sink` per record; earlier copies are kept.
pub fn organize(
    records: &[PictureRecord],
    destination: &Path,
    options: OrganizeOptions,
    sink: &mut dyn DiagnosticSink,
) -> OrganizeSummary {
    log::info!(
        "Organizing {} record(s) into {:?} by {:?}{}",
        records.len(),
        destination,
        options.group_by,
        if options.dry_run { " (dry run)" } else { "" }
    );

    let mut summary = OrganizeSummary::default();
    let mut created: HashSet<PathBuf> = HashSet::new();

    for record in records {
        let value = match options.group_by.select(record) {
            Some(value) => value,
            None => {
                log::debug!("No {:?} for {:?}, skipping", options.group_by, record.path);
                summary.skipped += 1;
                continue;
            }
        };

        match place_record(record, value, destination, options.dry_run, &mut created) {
            Ok(target) => {
                log::debug!("Copied {:?} to {:?}", record.path, target);
                summary.copied += 1;
            }
            Err(e) => {
                sink.report(Diagnostic::new(&record.path, e));
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "Organizing finished: {} copied, {} skipped, {} failed.",
        summary.copied,
        summary.skipped,
        summary.failed
    );
    summary
}

fn place_record(
    record: &PictureRecord,
    value: &str,
    destination: &Path,
    dry_run: bool,
    created: &mut HashSet<PathBuf>,
) -> Result<PathBuf, AppError> {
    let target_dir = destination.join(group_key(value)?);
    let file_name = record
        .path
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?;
    let target = target_dir.join(file_name);

    if dry_run {
        if target.exists() {
            return Err(AppError::Collision(target));
        }
        log::info!("Would copy {:?} to {:?}", record.path, target);
        return Ok(target);
    }

    if !created.contains(&target_dir) {
        fs::create_dir_all(&target_dir)?;
        log::trace!("Ensured directory {:?}", target_dir);
        created.insert(target_dir);
    }
    copy_no_clobber(&record.path, &target)?;
    Ok(target)
}

/// Copies `source` to `target`, failing if `target` already exists.
fn copy_no_clobber(source: &Path, target: &Path) -> Result<u64, AppError> {
    let mut input = File::open(source)?;
    let mut output = match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(AppError::Collision(target.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    let copied = io::copy(&mut input, &mut output).and_then(|n| {
        output.set_permissions(input.metadata()?.permissions())?;
        Ok(n)
    });
    match copied {
        Ok(n) => Ok(n),
        Err(e) => {
            drop(output);
            if let Err(cleanup) = fs::remove_file(target) {
                log::warn!("Could not remove partial copy {:?}: {}", target, cleanup);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(path: PathBuf, maker: Option<&str>, model: Option<&str>) -> PictureRecord {
        PictureRecord {
            path,
            maker: maker.map(String::from),
            model: model.map(String::from),
        }
    }

    fn options(group_by: GroupBy) -> OrganizeOptions {
        OrganizeOptions { group_by, dry_run: false }
    }

    #[test]
    fn group_key_lowercases() {
        assert_eq!(group_key("Canon").unwrap(), "canon");
        assert_eq!(group_key("NIKON CORPORATION").unwrap(), "nikon corporation");
        assert_eq!(group_key("EOS 5D Mark IV").unwrap(), "eos 5d mark iv");
    }

    #[test]
    fn group_key_rejects_values_that_escape_the_root() {
        for value in ["", ".", "..", "a/b", "/abs", "../etc"] {
            assert!(
                matches!(group_key(value), Err(AppError::InvalidGroupKey(_))),
                "{:?} should be rejected",
                value
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn group_key_keeps_names_that_are_valid_on_unix() {
        assert_eq!(group_key("   ").unwrap(), "   ");
        assert_eq!(group_key("A\\B").unwrap(), "a\\b");
        assert_eq!(group_key(" Pentax ").unwrap(), " pentax ");
    }

    #[test]
    fn copies_into_lowercased_maker_folder() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir(&source).expect("src");
        let photo = source.join("a.jpg");
        fs::write(&photo, b"jpeg bytes").expect("photo");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo.clone(), Some("Canon"), Some("EOS 5D"))];
        let summary = organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        assert_eq!(summary, OrganizeSummary { copied: 1, skipped: 0, failed: 0 });
        assert_eq!(fs::read(dest.join("canon").join("a.jpg")).expect("copy"), b"jpeg bytes");
        assert!(photo.exists());
        assert!(sink.is_empty());
    }

    #[test]
    fn groups_by_model_when_asked() {
        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("x.nef");
        fs::write(&photo, b"raw").expect("photo");
        let dest = temp.path().join("out");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo, Some("NIKON"), Some("D850"))];
        organize(&records, &dest, options(GroupBy::Model), &mut sink);

        assert!(dest.join("d850").join("x.nef").is_file());
        assert!(!dest.join("nikon").exists());
    }

    #[test]
    fn missing_field_leaves_filesystem_untouched() {
        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("a.jpg");
        fs::write(&photo, b"x").expect("photo");
        let dest = temp.path().join("dest");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo, None, Some("EOS 5D"))];
        let summary = organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        assert_eq!(summary.skipped, 1);
        assert!(!dest.exists());
        assert!(sink.is_empty());
    }

    #[test]
    fn second_run_collides_and_keeps_first_copy() {
        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("a.jpg");
        fs::write(&photo, b"original").expect("photo");
        let dest = temp.path().join("dest");
        let records = vec![record(photo.clone(), Some("Canon"), None)];

        let mut sink: Vec<Diagnostic> = Vec::new();
        organize(&records, &dest, options(GroupBy::Maker), &mut sink);
        fs::write(&photo, b"changed").expect("rewrite");
        let summary = organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        assert_eq!(summary.failed, 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].path, photo);
        assert!(sink[0].message.starts_with("Destination already exists"));
        assert_eq!(fs::read(dest.join("canon").join("a.jpg")).expect("copy"), b"original");
    }

    #[test]
    fn failed_record_does_not_stop_the_batch() {
        let temp = tempdir().expect("tempdir");
        let good = temp.path().join("good.jpg");
        fs::write(&good, b"ok").expect("good");
        let dest = temp.path().join("dest");
        let records = vec![
            record(temp.path().join("vanished.jpg"), Some("Sony"), None),
            record(temp.path().join("evil.jpg"), Some(".."), None),
            record(good, Some("Sony"), None),
        ];

        let mut sink: Vec<Diagnostic> = Vec::new();
        let summary = organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        assert_eq!(summary, OrganizeSummary { copied: 1, skipped: 0, failed: 2 });
        assert_eq!(sink.len(), 2);
        assert!(dest.join("sony").join("good.jpg").is_file());
        assert!(!dest.join("sony").join("vanished.jpg").exists());
    }

    #[test]
    fn dry_run_plans_without_writing() {
        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("a.jpg");
        fs::write(&photo, b"x").expect("photo");
        let dest = temp.path().join("dest");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo, Some("Fujifilm"), None)];
        let summary = organize(
            &records,
            &dest,
            OrganizeOptions { group_by: GroupBy::Maker, dry_run: true },
            &mut sink,
        );

        assert_eq!(summary.copied, 1);
        assert!(!dest.exists());
    }

    #[test]
    fn dry_run_still_detects_collisions() {
        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("a.jpg");
        fs::write(&photo, b"x").expect("photo");
        let dest = temp.path().join("dest");
        fs::create_dir_all(dest.join("leica")).expect("dir");
        fs::write(dest.join("leica").join("a.jpg"), b"old").expect("existing");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo, Some("LEICA"), None)];
        let summary = organize(
            &records,
            &dest,
            OrganizeOptions { group_by: GroupBy::Maker, dry_run: true },
            &mut sink,
        );

        assert_eq!(summary.failed, 1);
        assert_eq!(fs::read(dest.join("leica").join("a.jpg")).expect("kept"), b"old");
    }

    #[test]
    fn failed_byte_copy_leaves_no_partial_file() {
        let temp = tempdir().expect("tempdir");
        // a directory opens fine but cannot be read as a byte stream
        let not_a_file = temp.path().join("album.jpg");
        fs::create_dir(&not_a_file).expect("dir");
        let dest = temp.path().join("dest");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(not_a_file, Some("Canon"), None)];
        let summary = organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        assert_eq!(summary, OrganizeSummary { copied: 0, skipped: 0, failed: 1 });
        assert_eq!(sink.len(), 1);
        assert!(dest.join("canon").is_dir());
        assert!(!dest.join("canon").join("album.jpg").exists());
    }

    #[cfg(unix)]
    #[test]
    fn copy_carries_source_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("tempdir");
        let photo = temp.path().join("a.jpg");
        fs::write(&photo, b"x").expect("photo");
        fs::set_permissions(&photo, fs::Permissions::from_mode(0o444)).expect("chmod");
        let dest = temp.path().join("dest");

        let mut sink: Vec<Diagnostic> = Vec::new();
        let records = vec![record(photo.clone(), Some("Olympus"), None)];
        organize(&records, &dest, options(GroupBy::Maker), &mut sink);

        let mode = |path: &Path| fs::metadata(path).expect("metadata").permissions().mode() & 0o777;
        assert!(sink.is_empty());
        assert_eq!(mode(dest.join("olympus").join("a.jpg").as_path()), 0o444);
        assert_eq!(mode(photo.as_path()), 0o444);
    }
}
