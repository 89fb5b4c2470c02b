//! Line-level description of an edit.
//!
//! A [`LineDelta`] says that lines `start..start + removed` of the document
//! before the edit were replaced by lines `start..start + inserted` after it.
//! Lines before `start` are untouched; lines after the replaced range keep
//! their content and shift by `inserted - removed`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDelta {
    /// First affected line
    pub start: usize,
    /// Number of lines replaced in the old document
    pub removed: usize,
    /// Number of lines that replaced them in the new document
    pub inserted: usize,
}

impl LineDelta {
    pub fn new(start: usize, removed: usize, inserted: usize) -> Self {
        Self {
            start,
            removed,
            inserted,
        }
    }

    /// A delta for an in-place change of a single line.
    pub fn single(line: usize) -> Self {
        Self::new(line, 1, 1)
    }

    /// Returns true if the edit did not change the line count.
    pub fn is_in_place(&self) -> bool {
        self.removed == self.inserted
    }

    /// Signed change in the document's line count.
    pub fn line_count_change(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }

    /// Range of lines to recompute after the edit.
    pub fn changed_lines(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.inserted
    }

    /// Composes this delta with one that was applied after it.
    ///
    /// The result describes both edits as a single replacement of the
    /// original document.
    pub fn merge(self, next: LineDelta) -> LineDelta {
        let start = self.start.min(next.start);
        let mid_end = (self.start + self.inserted).max(next.start + next.removed);
        let old_end = mid_end as isize - self.line_count_change();
        let new_end = mid_end as isize + next.line_count_change();

        LineDelta {
            start,
            removed: (old_end - start as isize).max(0) as usize,
            inserted: (new_end - start as isize).max(0) as usize,
        }
    }
}
