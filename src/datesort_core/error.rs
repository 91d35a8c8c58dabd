use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatesortError {
    // Per-file errors
    #[error("Error processing {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Error organizing {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No metadata decoder registered for {0}")]
    UnsupportedFormat(PathBuf),

    // Metadata errors
    #[error("Date parsing error: {0}")]
    InvalidDateFormat(String),

    #[error("Exiftool error: {0}")]
    Exiftool(String),

    #[error("Not a valid {format} image: {reason}")]
    InvalidImage { format: String, reason: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl DatesortError {
    /// Wrap an I/O failure that happened while placing `path`.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatesortError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Result type for datesort operations.
pub type Result<T> = std::result::Result<T, DatesortError>;
