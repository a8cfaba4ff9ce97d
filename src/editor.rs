//! Interactive editing state machine for the annotation canvas.
//!
//! Owns the document, the per-record undo [`History`], and the
//! selection/hover/drag state that the canvas widget drives through pointer
//! and key events. Rendering, zooming and scrolling stay in the widget
//! layer; everything here works in image-space coordinates.

use std::rc::Rc;

use crate::model::{Annotation, AnnotationRef, Document, RecordRef};
use crate::undo::{Action, History};

/// Default hit/selection radius around an annotation, in image pixels.
pub const DEFAULT_RADIUS: u32 = 10;

/// Valid range for the hit radius.
pub const RADIUS_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// In-flight drag of the selected annotation.
#[derive(Debug, Clone, Copy)]
struct Drag {
    /// Annotation position when the drag started.
    origin: (u32, u32),
    /// Last pointer position, for incremental translation.
    prev: (u32, u32),
}

/// Editing state machine driven by canvas input events.
///
/// The editor performs each mutation on the model first and records the
/// matching [`Action`] afterwards; deletion captures its index and handle
/// before removing, since the removal is what the action must invert.
#[derive(Debug)]
pub struct Editor {
    document: Option<Document>,
    /// Index of the active record within the document.
    current: usize,
    selected_record: Option<RecordRef>,
    selected_annot: Option<AnnotationRef>,
    hover_annot: Option<AnnotationRef>,
    drag: Option<Drag>,
    radius: u32,
    history: History,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            document: None,
            current: 0,
            selected_record: None,
            selected_annot: None,
            hover_annot: None,
            drag: None,
            radius: DEFAULT_RADIUS,
            history: History::new(),
        }
    }

    /// Replace the open document and activate its first record.
    pub fn set_document(&mut self, document: Document) {
        self.document = Some(document);
        self.current = 0;
        self.load_record();
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Mutable access for the save layer (e.g. to clear the dirty flag).
    pub fn document_mut(&mut self) -> Option<&mut Document> {
        self.document.as_mut()
    }

    /// The active record.
    pub fn current_record(&self) -> Option<&RecordRef> {
        self.selected_record.as_ref()
    }

    /// Index of the active record.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn selected_annot(&self) -> Option<&AnnotationRef> {
        self.selected_annot.as_ref()
    }

    pub fn hover_annot(&self) -> Option<&AnnotationRef> {
        self.hover_annot.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Set the hit radius, clamped to [`RADIUS_RANGE`].
    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius.clamp(*RADIUS_RANGE.start(), *RADIUS_RANGE.end());
    }

    // ========================================================================
    // Pointer and key events
    // ========================================================================

    /// Pointer press at (x, y).
    ///
    /// Selects and starts dragging the first annotation within the hit
    /// radius; with no hit, creates a new annotation at the pointer and
    /// records the creation.
    pub fn press(&mut self, x: u32, y: u32) {
        let Some(record) = self.selected_record.clone() else {
            return;
        };

        let hit = record.borrow().hit_test(x, y, self.radius);
        if let Some((_, annot)) = hit {
            self.drag = Some(Drag {
                origin: annot.borrow().position(),
                prev: (x, y),
            });
            self.selected_annot = Some(annot);
            return;
        }

        let annot = Annotation::new_ref(x, y);
        record.borrow_mut().append(Rc::clone(&annot));
        self.history.record(Action::Create {
            record,
            annot: Rc::clone(&annot),
        });
        self.selected_annot = Some(annot);
        self.mark_dirty();
    }

    /// Pointer motion to (x, y).
    ///
    /// While dragging, translates the selected annotation by the pointer
    /// delta; otherwise updates the hover annotation.
    pub fn motion(&mut self, x: u32, y: u32) {
        let Some(record) = self.selected_record.clone() else {
            return;
        };

        if let Some(drag) = self.drag.as_mut() {
            let Some(annot) = self.selected_annot.as_ref() else {
                return;
            };
            let dx = delta(drag.prev.0, x);
            let dy = delta(drag.prev.1, y);
            drag.prev = (x, y);
            if (dx, dy) != (0, 0) {
                annot.borrow_mut().translate(dx, dy);
                self.mark_dirty();
            }
            return;
        }

        let hit = record.borrow().hit_test(x, y, self.radius);
        self.hover_annot = hit.map(|(_, annot)| annot);
    }

    /// Pointer release; ends a drag.
    ///
    /// If the annotation moved since the press, one move action covering the
    /// whole drag is recorded.
    pub fn release(&mut self, _x: u32, _y: u32) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let Some(annot) = self.selected_annot.clone() else {
            return;
        };

        let new = annot.borrow().position();
        if new != drag.origin {
            self.history.record(Action::Move {
                annot,
                old: drag.origin,
                new,
            });
        }
    }

    /// Delete the selected annotation, if any.
    pub fn delete_selected(&mut self) {
        let Some(record) = self.selected_record.clone() else {
            return;
        };
        let Some(annot) = self.selected_annot.take() else {
            return;
        };

        // Capture index and handle before the removal; the removal is what
        // the action must invert.
        let Some(pos) = record.borrow().position_of(&annot) else {
            return;
        };
        self.history.record(Action::Delete {
            record: Rc::clone(&record),
            annot,
            pos,
        });
        record.borrow_mut().remove(pos);
        self.hover_annot = None;
        self.drag = None;
        self.mark_dirty();
    }

    /// Arrow-key move of the selected annotation by one step.
    pub fn nudge_selected(&mut self, dx: i32, dy: i32) {
        let Some(annot) = self.selected_annot.clone() else {
            return;
        };

        let old = annot.borrow().position();
        annot.borrow_mut().translate(dx, dy);
        let new = annot.borrow().position();
        if new != old {
            self.history.record(Action::Move { annot, old, new });
            self.mark_dirty();
        }
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Revert the most recent edit on the active record.
    pub fn undo(&mut self) {
        if self.history.undo() {
            self.mark_dirty();
        }
    }

    /// Re-apply the most recently undone edit on the active record.
    pub fn redo(&mut self) {
        if self.history.redo() {
            self.mark_dirty();
        }
    }

    // ========================================================================
    // Selection and record navigation
    // ========================================================================

    /// Select the annotation at `pos` in the active record.
    pub fn select_annot(&mut self, pos: usize) {
        let Some(record) = self.selected_record.as_ref() else {
            return;
        };
        self.selected_annot = record.borrow().annots().get(pos).cloned();
    }

    pub fn clear_selection(&mut self) {
        self.selected_annot = None;
        self.drag = None;
    }

    /// Activate the record at `idx`.
    ///
    /// Switching records drops selection, hover and the whole history;
    /// history is scoped to one record.
    pub fn select_record(&mut self, idx: usize) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        if idx >= document.len() || (idx == self.current && self.selected_record.is_some()) {
            return;
        }
        self.current = idx;
        self.load_record();
    }

    pub fn first(&mut self) {
        self.select_record(0);
    }

    pub fn prev(&mut self) {
        if self.current >= 1 {
            self.select_record(self.current - 1);
        }
    }

    pub fn next(&mut self) {
        self.select_record(self.current + 1);
    }

    pub fn last(&mut self) {
        let len = self.document.as_ref().map(Document::len).unwrap_or(0);
        if len >= 1 {
            self.select_record(len - 1);
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn load_record(&mut self) {
        self.selected_record = self
            .document
            .as_ref()
            .and_then(|document| document.record(self.current));
        self.selected_annot = None;
        self.hover_annot = None;
        self.drag = None;
        self.history.clear();
    }

    fn mark_dirty(&mut self) {
        if let Some(document) = self.document.as_mut() {
            document.mark_dirty();
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed pointer delta between two unsigned coordinates.
fn delta(from: u32, to: u32) -> i32 {
    (i64::from(to) - i64::from(from)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// ============================================================================
// Tests
// ============================================================================
