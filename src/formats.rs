use lazy_static::lazy_static;

lazy_static! {
    /// Extensions recognized as images, lower-case with the leading dot.
    pub static ref SUPPORTED_FORMATS: Vec<&'static str> = vec![
        ".jpg", ".png", ".gif", ".tiff", ".cr2", ".nef", ".arw", ".dng", ".raf",
        ".rw2", ".erf", ".nrw", ".crw", ".3fr", ".sr2", ".k25", ".kc2", ".mef",
        ".cs1", ".orf", ".mos", ".kdc", ".cr3", ".ari", ".srf", ".srw", ".j6i",
        ".fff", ".mrw", ".x3f", ".mdc", ".rwl", ".pef", ".iiq", ".cxi", ".nksc",
    ];
}

/// Returns the extension of `file_name` from its last dot, dot included.
fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

pub fn is_supported(file_name: &str) -> bool {
    match extension_of(file_name) {
        Some(ext) => {
            let ext = ext.to_lowercase();
            SUPPORTED_FORMATS.iter().any(|known| *known == ext)
        }
        None => false,
    }
}
