//! Document model: the root container of records for one open folder.

use std::path::{Path, PathBuf};

use crate::error::DocumentError;

use super::record::{Record, RecordRef};

/// Supported image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a filename has a supported image extension.
fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// The annotation set for one folder of images.
///
/// Owns the ordered record sequence and the dirty flag. The flag is raised
/// by every model-mutating edit and cleared after a successful save.
#[derive(Debug, Clone, Default)]
pub struct Document {
    root_path: PathBuf,
    records: Vec<RecordRef>,
    dirty: bool,
}

impl Document {
    /// Create an empty document rooted at `root_path`.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            records: Vec::new(),
            dirty: false,
        }
    }

    /// Build a document by scanning `folder` for image files,
    /// non-recursively.
    ///
    /// One record per image, sorted by filename for a deterministic record
    /// order.
    pub fn from_folder(folder: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let folder = folder.into();

        let mut names: Vec<String> = std::fs::read_dir(&folder)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| is_image_filename(name))
            .collect();

        if names.is_empty() {
            return Err(DocumentError::NoImages { path: folder });
        }

        names.sort();
        log::info!("Scanned folder {:?}: found {} images", folder, names.len());

        let records = names.into_iter().map(Record::new_ref).collect();
        Ok(Self {
            root_path: folder,
            records,
            dirty: false,
        })
    }

    /// Folder the record filenames are relative to.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The live record sequence, in order.
    pub fn records(&self) -> &[RecordRef] {
        &self.records
    }

    /// Handle to the record at `idx`.
    pub fn record(&self, idx: usize) -> Option<RecordRef> {
        self.records.get(idx).cloned()
    }

    pub fn add_record(&mut self, record: RecordRef) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether there are unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Raise the dirty flag. Called by every model-mutating edit.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag. Call after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

// ============================================================================
// Tests
// ============================================================================
