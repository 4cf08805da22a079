use crate::metadata::{CameraIdentity, MetadataDirectory};

/// Reads the camera identity from the first top-level image attributes
/// directory. Maker-note, sub-IFD and thumbnail directories are ignored
/// even when they carry the same tags.
pub fn resolve(directories: &[MetadataDirectory]) -> Option<CameraIdentity> {
    directories.iter().find_map(|directory| match directory {
        MetadataDirectory::ImageAttributes(attrs) => Some(CameraIdentity {
            maker: attrs.make().map(str::to_string),
            model: attrs.model().map(str::to_string),
        }),
        MetadataDirectory::Other { kind, tag_count } => {
            log::trace!("Ignoring {:?} directory with {} tag(s)", kind, tag_count);
            None
        }
    })
}
