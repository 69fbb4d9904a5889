use std::path::PathBuf;

use thiserror::Error;

/// Why an upload could not be framed. The first failing step wins.
#[derive(Error, Debug)]
pub enum FramingError {
    #[error("Invalid file - please upload an image ({allowed}), got '{mime_type}'")]
    InvalidFileType { mime_type: String, allowed: String },

    #[error("Image must be at least {min_width} x {min_height} pixels, got {width} x {height}")]
    ImageTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("failed to read image {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write image {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("face detection failed: {0}")]
    Detection(String),
}
