//! Error types for document operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a document from disk.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// I/O error while scanning the image folder
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The folder contained no image files
    #[error("no image files found in {path:?}")]
    NoImages {
        /// The folder that was scanned
        path: PathBuf,
    },
}
