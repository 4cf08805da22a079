// src/metadata.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Device-level tags from the primary image file directory (IFD0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttributes {
    make: Option<String>,
    model: Option<String>,
}

impl ImageAttributes {
    pub fn new(make: Option<String>, model: Option<String>) -> Self {
        Self { make, model }
    }

    pub fn make(&self) -> Option<&str> {
        self.make.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

/// Directory kinds that are decoded but never consulted for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    ExifSubIfd,
    Gps,
    Interop,
    Thumbnail,
    Unrecognized,
}

/// One logical metadata block found in an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataDirectory {
    ImageAttributes(ImageAttributes),
    Other { kind: DirectoryKind, tag_count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraIdentity {
    pub maker: Option<String>,
    pub model: Option<String>,
}

impl CameraIdentity {
    pub fn is_empty(&self) -> bool {
        self.maker.is_none() && self.model.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PictureRecord {
    pub path: PathBuf,
    pub maker: Option<String>,
    pub model: Option<String>,
}

impl PictureRecord {
    pub fn new(path: PathBuf, identity: CameraIdentity) -> Self {
        Self {
            path,
            maker: identity.maker,
            model: identity.model,
        }
    }
}
