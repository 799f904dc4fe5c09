use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup problems. Reported once on stderr; the window never opens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("images path '{}' does not exist or is not a directory", .0.display())]
    ImagesPathMissing(PathBuf),

    #[error("invalid glob for images path '{}': {source}", .path.display())]
    ImagesPattern {
        path: PathBuf,
        #[source]
        source: glob::PatternError,
    },

    #[error("no images found in '{}'", .0.display())]
    NoImages(PathBuf),

    #[error("patch size must be a positive number of pixels")]
    ZeroPatchSize,

    #[error("quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("unknown output format '{0}' (expected png, jpeg, bmp, tga, tiff or source)")]
    UnknownFormat(String),

    #[error("could not create output directory '{}': {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no images folder selected")]
    PickerCancelled,
}

/// A source image that could not be decoded when it became current.
#[derive(Debug, Error)]
#[error("could not load '{}': {source}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// A failed save. Files written before the failing index stay on disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("patch {index}: could not write '{}': {source}", .path.display())]
    Write {
        index: usize,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("patch {index} lies outside the {width}x{height} source image")]
    PatchOutOfBounds { index: usize, width: u32, height: u32 },

    #[error("'{}' is not loaded; nothing to export", .0.display())]
    NotLoaded(PathBuf),
}

impl ExportError {
    /// Index of the patch that failed, when the failure is tied to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            ExportError::Write { index, .. } | ExportError::PatchOutOfBounds { index, .. } => Some(*index),
            ExportError::NotLoaded(_) => None,
        }
    }
}

/// Runtime errors that reach the top of the event loop. The loop reports
/// them and keeps running.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
