use crate::error::AppError;
use crate::metadata::{DirectoryKind, ImageAttributes, MetadataDirectory};
use exif::{Context, Exif, Field, In, Reader, Tag, Value};
use std::io::{BufRead, Seek};

/// A seekable, buffered byte stream over one image file.
pub trait ImageStream: BufRead + Seek {}

impl<T: BufRead + Seek> ImageStream for T {}

pub trait MetadataReader {
    /// Decodes the metadata directories held by `stream`.
    ///
    /// A recognized container without any metadata block yields an empty
    /// list. Unrecognized or corrupt containers fail with [`AppError::Decode`].
    fn read_metadata(&self, stream: &mut dyn ImageStream) -> Result<Vec<MetadataDirectory>, AppError>;
}

/// [`MetadataReader`] backed by kamadak-exif.
#[derive(Debug, Default)]
pub struct ExifMetadataReader;

impl MetadataReader for ExifMetadataReader {
    fn read_metadata(&self, mut stream: &mut dyn ImageStream) -> Result<Vec<MetadataDirectory>, AppError> {
        match Reader::new().read_from_container(&mut stream) {
            Ok(exif) => Ok(directories_from_exif(&exif)),
            Err(exif::Error::NotFound(container)) => {
                log::trace!("No EXIF block in {} container", container);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn directory_kind(field: &Field) -> Option<DirectoryKind> {
    if field.ifd_num != In::PRIMARY {
        return Some(DirectoryKind::Thumbnail);
    }
    match field.tag.context() {
        Context::Tiff => None,
        Context::Exif => Some(DirectoryKind::ExifSubIfd),
        Context::Gps => Some(DirectoryKind::Gps),
        Context::Interop => Some(DirectoryKind::Interop),
        _ => Some(DirectoryKind::Unrecognized),
    }
}

fn directories_from_exif(exif: &Exif) -> Vec<MetadataDirectory> {
    let mut primary_tags = 0usize;
    let mut others: Vec<(DirectoryKind, usize)> = Vec::new();

    for field in exif.fields() {
        match directory_kind(field) {
            None => primary_tags += 1,
            Some(kind) => match others.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, count)) => *count += 1,
                None => others.push((kind, 1)),
            },
        }
    }

    let mut directories = Vec::with_capacity(others.len() + 1);
    if primary_tags > 0 {
        let attributes = ImageAttributes::new(
            describe(exif, Tag::Make),
            describe(exif, Tag::Model),
        );
        directories.push(MetadataDirectory::ImageAttributes(attributes));
    }
    directories.extend(
        others
            .into_iter()
            .map(|(kind, tag_count)| MetadataDirectory::Other { kind, tag_count }),
    );
    directories
}

/// Human-readable value of `tag` in IFD0, if present.
fn describe(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(strings) => strings
            .first()
            .map(|s| String::from_utf8_lossy(s).into_owned()),
        _ => Some(field.display_value().to_string()),
    }
}
