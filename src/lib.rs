//! Pannot — editing core for a point-annotation tool.
//!
//! A user loads a folder of images (records), places point annotations on
//! each image, and edits them through an undoable action history. This
//! crate holds the data model, the command-pattern undo system and the
//! canvas-facing editing state machine; rendering and the widget layer live
//! with the embedding application.

pub mod editor;
pub mod error;
pub mod model;
pub mod undo;

pub use editor::Editor;
pub use error::DocumentError;
pub use model::{Annotation, AnnotationRef, Document, Record, RecordRef};
pub use undo::{Action, History, HistoryConfig};
