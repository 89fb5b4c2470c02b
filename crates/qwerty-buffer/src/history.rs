//! Undo/redo history.
//!
//! Edits are recorded as inserted or deleted text at a character position.
//! Consecutive single-line edits that continue each other (typing forward,
//! backspacing) collapse into one undo step; a newline always starts a new
//! step. Compound operations such as a replace are recorded as one group.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single recorded edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub kind: EditKind,
    /// Character index where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Returns the edit that reverses this one.
    pub fn inverse(&self) -> Self {
        Self {
            kind: match self.kind {
                EditKind::Insert => EditKind::Delete,
                EditKind::Delete => EditKind::Insert,
            },
            position: self.position,
            content: self.content.clone(),
        }
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if `next` continues this edit on the same line.
    pub fn can_coalesce(&self, next: &Edit) -> bool {
        if self.kind != next.kind || self.content.contains('\n') || next.content.contains('\n') {
            return false;
        }

        match self.kind {
            EditKind::Insert => self.position + self.char_len() == next.position,
            // Backspace lands just before us, forward delete at the same spot
            EditKind::Delete => {
                next.position + next.char_len() == self.position || next.position == self.position
            }
        }
    }

    /// Folds `next` into this edit. Only valid when [`Edit::can_coalesce`] holds.
    pub fn coalesce(&mut self, next: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&next.content),
            EditKind::Delete if next.position < self.position => {
                self.content.insert_str(0, &next.content);
                self.position = next.position;
            }
            EditKind::Delete => self.content.push_str(&next.content),
        }
    }
}

/// Bounded undo/redo stacks of edit groups.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Vec<Edit>>,
    redo_stack: Vec<Vec<Edit>>,
    max_size: usize,
    /// Open group for compound operations
    grouping: bool,
}

impl History {
    /// Creates a history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            grouping: false,
        }
    }

    /// Records an edit. Clears the redo stack.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if let Some(group) = self.undo_stack.back_mut() {
            if self.grouping {
                group.push(edit);
                return;
            }
            if let [last] = group.as_mut_slice() {
                if last.can_coalesce(&edit) {
                    last.coalesce(edit);
                    return;
                }
            }
        }

        self.undo_stack.push_back(vec![edit]);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Starts a group: everything pushed until [`History::end_group`] is a
    /// single undo step.
    pub fn begin_group(&mut self) {
        self.redo_stack.clear();
        self.undo_stack.push_back(Vec::new());
        self.grouping = true;
    }

    pub fn end_group(&mut self) {
        self.grouping = false;
        if self.undo_stack.back().is_some_and(Vec::is_empty) {
            self.undo_stack.pop_back();
        }
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Pops the last undo step. Edits are returned in the order they were
    /// applied; the caller reverses them back to front.
    pub fn undo(&mut self) -> Option<Vec<Edit>> {
        let group = self.undo_stack.pop_back()?;
        self.redo_stack.push(group.clone());
        Some(group)
    }

    /// Pops the last undone step, in application order.
    pub fn redo(&mut self) -> Option<Vec<Edit>> {
        let group = self.redo_stack.pop()?;
        self.undo_stack.push_back(group.clone());
        Some(group)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
