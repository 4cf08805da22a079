use exif::Error as ExifError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] ExifError),

    #[error("Destination already exists: {}", .0.display())]
    Collision(PathBuf),

    #[error("Invalid group key: {0:?}")]
    InvalidGroupKey(String),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}
