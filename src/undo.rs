//! Undo/Redo system for annotation edits.
//!
//! This module implements the Command pattern for the annotation editor.
//! Each reversible edit is captured as an [`Action`] that knows how to undo
//! and redo itself against the model, and [`History`] keeps the classic
//! two-stack linear undo/redo discipline.

use std::rc::Rc;

use crate::model::{AnnotationRef, RecordRef};

// ============================================================================
// Actions
// ============================================================================

/// A reversible edit.
///
/// Each variant captures shared handles to every model object it touches, so
/// the action stays valid after the originating selection is cleared, and a
/// deleted annotation stays alive for re-insertion on undo.
///
/// Undo and redo may be invoked any number of times with identical results.
/// Callers guarantee the structural preconditions: the captured indices must
/// still be valid, i.e. no other structural edit of the same record may
/// intervene between recording and (un)doing an action.
#[derive(Debug, Clone)]
pub enum Action {
    /// An annotation was appended to a record.
    Create {
        record: RecordRef,
        annot: AnnotationRef,
    },
    /// An annotation was removed from a record at `pos`.
    Delete {
        record: RecordRef,
        annot: AnnotationRef,
        pos: usize,
    },
    /// An annotation was moved from `old` to `new`.
    Move {
        annot: AnnotationRef,
        old: (u32, u32),
        new: (u32, u32),
    },
}

impl Action {
    /// Revert this edit on the model.
    pub fn undo(&self) {
        match self {
            Action::Create { record, annot } => {
                // Creation always appends and no structural edit intervenes
                // before undo, so the created annotation is the last element.
                let mut record = record.borrow_mut();
                let last = record.len() - 1;
                let removed = record.remove(last);
                debug_assert!(Rc::ptr_eq(&removed, annot));
            }
            Action::Delete { record, annot, pos } => {
                record.borrow_mut().insert(*pos, Rc::clone(annot));
            }
            Action::Move { annot, old, .. } => {
                annot.borrow_mut().set_position(old.0, old.1);
            }
        }
    }

    /// Re-apply this edit on the model.
    pub fn redo(&self) {
        match self {
            Action::Create { record, annot } => {
                record.borrow_mut().append(Rc::clone(annot));
            }
            Action::Delete { record, pos, .. } => {
                record.borrow_mut().remove(*pos);
            }
            Action::Move { annot, new, .. } => {
                annot.borrow_mut().set_position(new.0, new.1);
            }
        }
    }

    /// Human-readable label for this action.
    pub fn description(&self) -> &'static str {
        match self {
            Action::Create { .. } => "Create annotation",
            Action::Delete { .. } => "Delete annotation",
            Action::Move { .. } => "Move annotation",
        }
    }
}

// ============================================================================
// History
// ============================================================================

/// Configuration for the undo history.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Maximum number of actions to keep; the oldest drop off first.
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

/// Linear undo/redo history.
///
/// Maintains two LIFO stacks of [`Action`]s:
/// - `undo_stack`: recorded or redone actions, most recent on top
/// - `redo_stack`: undone actions, most recent on top
///
/// Recording a new action clears the redo stack; there is no branching
/// timeline. `undo` reverts the top undo-stack action and moves it to the
/// redo stack; `redo` is the mirror operation.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
    config: HistoryConfig,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a freshly performed edit.
    ///
    /// The mutation must already be applied to the model; recording only
    /// stores how to invert it. Any new action invalidates the forward
    /// history, so the redo stack is cleared unconditionally.
    pub fn record(&mut self, action: Action) {
        log::debug!("📝 History: recorded '{}'", action.description());
        self.redo_stack.clear();
        self.undo_stack.push(action);

        // Limit history size
        while self.undo_stack.len() > self.config.max_history {
            self.undo_stack.remove(0);
        }
    }

    /// Revert the most recently recorded or redone action.
    ///
    /// No-op on an empty undo stack. Returns whether an action was applied.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        log::debug!("⏪ Undo: '{}'", action.description());
        action.undo();
        self.redo_stack.push(action);
        true
    }

    /// Re-apply the most recently undone action.
    ///
    /// No-op on an empty redo stack. Returns whether an action was applied.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        log::debug!("⏩ Redo: '{}'", action.description());
        action.redo();
        self.undo_stack.push(action);
        true
    }

    /// Drop both stacks. Invoked when the active record changes; history is
    /// scoped to one record.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ History cleared");
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the action that would be undone.
    pub fn undo_description(&self) -> Option<&'static str> {
        self.undo_stack.last().map(Action::description)
    }

    /// Description of the action that would be redone.
    pub fn redo_description(&self) -> Option<&'static str> {
        self.redo_stack.last().map(Action::description)
    }

    /// Number of actions in undo history.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of actions in redo history.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, Record};

    /// Append a fresh annotation to `record` and return the matching
    /// recorded action, mimicking the controller's mutate-then-record order.
    fn perform_create(record: &RecordRef, x: u32, y: u32) -> Action {
        let annot = Annotation::new_ref(x, y);
        record.borrow_mut().append(Rc::clone(&annot));
        Action::Create {
            record: Rc::clone(record),
            annot,
        }
    }

    /// Remove the annotation at `pos` from `record`, capturing index and
    /// handle before the removal.
    fn perform_delete(record: &RecordRef, pos: usize) -> Action {
        let annot = Rc::clone(&record.borrow().annots()[pos]);
        let action = Action::Delete {
            record: Rc::clone(record),
            annot,
            pos,
        };
        record.borrow_mut().remove(pos);
        action
    }

    /// Move `annot` to (x, y) and return the matching recorded action.
    fn perform_move(annot: &AnnotationRef, x: u32, y: u32) -> Action {
        let old = annot.borrow().position();
        annot.borrow_mut().set_position(x, y);
        Action::Move {
            annot: Rc::clone(annot),
            old,
            new: (x, y),
        }
    }

    fn positions(record: &RecordRef) -> Vec<(u32, u32)> {
        record
            .borrow()
            .annots()
            .iter()
            .map(|a| a.borrow().position())
            .collect()
    }

    #[test]
    fn test_history_basic() {
        let mut history = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        let record = Record::new_ref("test.png");
        history.record(perform_create(&record, 10, 10));
        assert!(history.can_undo());
        assert!(!history.can_redo());

        assert!(history.undo());
        assert!(!history.can_undo());
        assert!(history.can_redo());

        assert!(history.redo());
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_empty_stacks_are_noops() {
        let mut history = History::new();
        assert!(!history.undo());
        assert!(!history.redo());
    }

    #[test]
    fn test_create_undo_redo() {
        let record = Record::new_ref("test.png");
        let mut history = History::new();

        history.record(perform_create(&record, 10, 10));
        let annot = Rc::clone(&record.borrow().annots()[0]);
        assert_eq!(record.borrow().len(), 1);

        history.undo();
        assert_eq!(record.borrow().len(), 0);
        assert!(record.borrow().position_of(&annot).is_none());

        history.redo();
        assert_eq!(record.borrow().len(), 1);
        assert_eq!(record.borrow().position_of(&annot), Some(0));
    }

    #[test]
    fn test_delete_restores_position() {
        let record = Record::new_ref("test.png");
        let mut history = History::new();
        for x in 0..5 {
            record.borrow_mut().append(Annotation::new_ref(x, 0));
        }

        history.record(perform_delete(&record, 2));
        assert_eq!(positions(&record), vec![(0, 0), (1, 0), (3, 0), (4, 0)]);

        history.undo();
        assert_eq!(
            positions(&record),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]
        );

        history.redo();
        assert_eq!(positions(&record), vec![(0, 0), (1, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_move_round_trip_no_drift() {
        let annot = Annotation::new_ref(10, 10);
        let mut history = History::new();

        history.record(perform_move(&annot, 50, 60));
        assert_eq!(annot.borrow().position(), (50, 60));

        for _ in 0..100 {
            history.undo();
            assert_eq!(annot.borrow().position(), (10, 10));
            history.redo();
            assert_eq!(annot.borrow().position(), (50, 60));
        }
    }

    #[test]
    fn test_record_clears_redo() {
        let record = Record::new_ref("test.png");
        let mut history = History::new();

        history.record(perform_create(&record, 10, 10));
        history.undo();
        assert!(history.can_redo());

        history.record(perform_create(&record, 20, 20));
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_lifo_ordering() {
        let annot = Annotation::new_ref(0, 0);
        let mut history = History::new();

        // A1: (0,0) -> (1,1), A2: (1,1) -> (2,2), A3: (2,2) -> (3,3)
        for i in 1..=3 {
            history.record(perform_move(&annot, i, i));
        }
        assert_eq!(annot.borrow().position(), (3, 3));

        // Undos revert A3, A2, A1 in that order.
        history.undo();
        assert_eq!(annot.borrow().position(), (2, 2));
        history.undo();
        assert_eq!(annot.borrow().position(), (1, 1));
        history.undo();
        assert_eq!(annot.borrow().position(), (0, 0));

        // Redos reapply A1, A2, A3 in that order.
        history.redo();
        assert_eq!(annot.borrow().position(), (1, 1));
        history.redo();
        assert_eq!(annot.borrow().position(), (2, 2));
        history.redo();
        assert_eq!(annot.borrow().position(), (3, 3));
    }

    #[test]
    fn test_full_invertibility() {
        let record = Record::new_ref("test.png");
        let mut history = History::new();

        // A mixed sequence of edits on one record.
        history.record(perform_create(&record, 10, 10));
        history.record(perform_create(&record, 20, 20));
        let second = Rc::clone(&record.borrow().annots()[1]);
        history.record(perform_move(&second, 25, 30));
        history.record(perform_delete(&record, 0));
        history.record(perform_create(&record, 40, 40));

        let after = positions(&record);
        assert_eq!(after, vec![(25, 30), (40, 40)]);

        for _ in 0..5 {
            assert!(history.undo());
        }
        assert!(!history.can_undo());
        assert_eq!(positions(&record), Vec::<(u32, u32)>::new());

        for _ in 0..5 {
            assert!(history.redo());
        }
        assert!(!history.can_redo());
        assert_eq!(positions(&record), after);
    }

    #[test]
    fn test_max_history() {
        let record = Record::new_ref("test.png");
        let mut history = History::with_config(HistoryConfig { max_history: 3 });

        for _ in 0..5 {
            history.record(perform_create(&record, 0, 0));
        }
        assert_eq!(history.undo_count(), 3);
    }

    #[test]
    fn test_descriptions() {
        let record = Record::new_ref("test.png");
        let mut history = History::new();
        assert_eq!(history.undo_description(), None);

        history.record(perform_create(&record, 10, 10));
        assert_eq!(history.undo_description(), Some("Create annotation"));
        assert_eq!(history.redo_description(), None);

        history.undo();
        assert_eq!(history.undo_description(), None);
        assert_eq!(history.redo_description(), Some("Create annotation"));
    }
}
