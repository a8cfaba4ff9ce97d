//! Data model: annotations, records, and documents.

mod annotation;
mod document;
mod record;

pub use annotation::{Annotation, AnnotationRef};
pub use document::{Document, IMAGE_EXTENSIONS};
pub use record::{Record, RecordRef};
