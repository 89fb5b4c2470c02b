//! Rope-backed text buffer.
//!
//! Lines are addressed by 0-based index. An empty buffer has one empty line,
//! and a buffer ending with a line break has an empty last line after it.

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::history::{Edit, EditKind, History};
use crate::{BufferError, BufferResult, LineDelta, Position};

const DEFAULT_HISTORY: usize = 1000;

/// A text buffer backed by a rope data structure.
///
/// `TextBuffer` is `Send` but is meant to be mutated from the thread that
/// owns the editing surface.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    history: History,
    /// Whether the buffer has unsaved changes
    modified: bool,
    file_path: Option<PathBuf>,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use qwerty_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from("")
    }

    /// Associates the buffer with a file path without touching the disk.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Saves the buffer to its associated file.
    pub fn save(&mut self) -> BufferResult<()> {
        let path = self.file_path.clone().ok_or(BufferError::NoFilePath)?;
        self.save_as(&path)
    }

    /// Saves the buffer to a specific path and makes it the associated file.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> BufferResult<()> {
        let path = path.as_ref();

        // Write to a uniquely named file in the same directory, then rename
        // over the target. The temp file is removed if anything fails.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file_mut());
            self.rope.write_to(&mut writer)?;
            std::io::Write::flush(&mut writer)?;
        }
        temp.persist(path).map_err(|e| e.error)?;

        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a line including its trailing line break, if any.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        self.check_line(line_idx)?;
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a line without its trailing line break.
    pub fn line_content(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        Ok(match self.line(line_idx)? {
            Cow::Borrowed(s) => Cow::Borrowed(strip_line_break(s)),
            Cow::Owned(mut s) => {
                let len = strip_line_break(&s).len();
                s.truncate(len);
                Cow::Owned(s)
            }
        })
    }

    /// Iterates over all lines without their line breaks.
    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        (0..self.len_lines()).filter_map(|idx| self.line_content(idx).ok())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of characters (Unicode scalar values) in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Number of lines in the buffer. Never zero.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<LineDelta> {
        let delta = self.apply_insert(char_idx, text)?;
        self.history.push(Edit::insert(char_idx, text));
        Ok(delta)
    }

    /// Inserts text at a line:column position.
    pub fn insert_at(&mut self, pos: Position, text: &str) -> BufferResult<LineDelta> {
        let char_idx = self.position_to_char_idx(pos)?;
        self.insert(char_idx, text)
    }

    /// Deletes text in a character range.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<LineDelta> {
        let (deleted, delta) = self.apply_delete(range.clone())?;
        self.history.push(Edit::delete(range.start, deleted));
        Ok(delta)
    }

    /// Replaces text in a range. Undone as a single step.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> BufferResult<LineDelta> {
        let (deleted, removed) = self.apply_delete(range.clone())?;
        let inserted = self.apply_insert(range.start, text)?;

        self.history.begin_group();
        self.history.push(Edit::delete(range.start, deleted));
        self.history.push(Edit::insert(range.start, text));
        self.history.end_group();

        Ok(removed.merge(inserted))
    }

    /// Replaces the text of one line, keeping its line break.
    pub fn set_line(&mut self, line_idx: usize, text: &str) -> BufferResult<LineDelta> {
        self.check_line(line_idx)?;
        let start = self.rope.line_to_char(line_idx);
        let content_len = self.line_content(line_idx)?.chars().count();
        self.replace(start..start + content_len, text)
    }

    fn apply_insert(&mut self, char_idx: usize, text: &str) -> BufferResult<LineDelta> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let start = self.rope.char_to_line(char_idx);
        let lines_before = self.len_lines();
        self.rope.insert(char_idx, text);
        self.modified = true;

        let added = self.len_lines().saturating_sub(lines_before);
        Ok(LineDelta::new(start, 1, 1 + added))
    }

    fn apply_delete(&mut self, range: Range<usize>) -> BufferResult<(String, LineDelta)> {
        if range.start > range.end {
            return Err(BufferError::InvalidCharIndex(range.start));
        }
        if range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }

        let start = self.rope.char_to_line(range.start);
        let removed = self.rope.char_to_line(range.end) - start + 1;
        let lines_before = self.len_lines();

        let deleted: String = self.rope.slice(range.clone()).into();
        self.rope.remove(range);
        self.modified = true;

        // Joining a lone `\r` with a following `\n` drops one more line than
        // the range spans, leaving zero replacement lines.
        let dropped = lines_before.saturating_sub(self.len_lines());
        Ok((deleted, LineDelta::new(start, removed, removed.saturating_sub(dropped))))
    }

    fn apply(&mut self, edit: &Edit) -> BufferResult<LineDelta> {
        match edit.kind {
            EditKind::Insert => self.apply_insert(edit.position, &edit.content),
            EditKind::Delete => {
                let end = edit.position + edit.content.chars().count();
                self.apply_delete(edit.position..end).map(|(_, delta)| delta)
            }
        }
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last step, returning the lines it touched.
    pub fn undo(&mut self) -> BufferResult<LineDelta> {
        let step = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        let mut merged: Option<LineDelta> = None;
        for edit in step.iter().rev() {
            let delta = self.apply(&edit.inverse())?;
            merged = Some(merged.map_or(delta, |m| m.merge(delta)));
        }
        merged.ok_or(BufferError::NothingToUndo)
    }

    /// Redoes the last undone step, returning the lines it touched.
    pub fn redo(&mut self) -> BufferResult<LineDelta> {
        let step = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        let mut merged: Option<LineDelta> = None;
        for edit in &step {
            let delta = self.apply(edit)?;
            merged = Some(merged.map_or(delta, |m| m.merge(delta)));
        }
        merged.ok_or(BufferError::NothingToRedo)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ==================== Position Conversion ====================

    /// Converts a line:column position to a character index.
    ///
    /// The column may point one past the line's last character.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        if pos.line >= self.len_lines() || pos.column > self.rope.line(pos.line).len_chars() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }
        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character index to a line:column position.
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn check_line(&self, line_idx: usize) -> BufferResult<()> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::LineOutOfBounds(line_idx));
        }
        Ok(())
    }
}

fn strip_line_break(line: &str) -> &str {
    line.strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .or_else(|| line.strip_suffix('\r'))
        .unwrap_or(line)
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            history: History::new(DEFAULT_HISTORY),
            modified: false,
            file_path: None,
        }
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_content_strips_breaks() {
        let buffer = TextBuffer::from("one\r\ntwo\nthree");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(0).unwrap(), "one\r\n");
        assert_eq!(buffer.line_content(0).unwrap(), "one");
        assert_eq!(buffer.line_content(1).unwrap(), "two");
        assert_eq!(buffer.line_content(2).unwrap(), "three");
        assert!(buffer.line(3).is_err());
    }

    #[test]
    fn test_trailing_newline_adds_empty_line() {
        let buffer = TextBuffer::from("a\n");
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(buffer.line_content(1).unwrap(), "");
    }

    #[test]
    fn test_in_place_edit_is_single_line() {
        let mut buffer = TextBuffer::from("a\nb\nc");
        let delta = buffer.insert(2, "xyz").unwrap();
        assert_eq!(delta, LineDelta::single(1));
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_delete_across_lines() {
        let mut buffer = TextBuffer::from("a\nb\nc\nd");
        // Remove "b\nc\n"
        let delta = buffer.delete(2..6).unwrap();
        assert_eq!(delta, LineDelta::new(1, 3, 1));
        assert_eq!(buffer.text(), "a\nd");
    }

    #[test]
    fn test_replace_undoes_in_one_step() {
        let mut buffer = TextBuffer::from("x = 1\ny = 2");
        buffer.replace(0..5, "x = 10\nz = 3").unwrap();
        assert_eq!(buffer.text(), "x = 10\nz = 3\ny = 2");

        buffer.undo().unwrap();
        assert_eq!(buffer.text(), "x = 1\ny = 2");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_set_line_keeps_break() {
        let mut buffer = TextBuffer::from("first\nsecond\nthird");
        let delta = buffer.set_line(1, "2nd").unwrap();
        assert_eq!(delta, LineDelta::single(1));
        assert_eq!(buffer.text(), "first\n2nd\nthird");
    }

    #[test]
    fn test_position_round_trip() {
        let buffer = TextBuffer::from("ab\ncd");
        let idx = buffer.position_to_char_idx(Position::new(1, 1)).unwrap();
        assert_eq!(idx, 4);
        assert_eq!(buffer.char_idx_to_position(idx).unwrap(), Position::new(1, 1));
        assert!(buffer.position_to_char_idx(Position::new(0, 9)).is_err());
    }

    #[test]
    fn test_save_as_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.py");

        let mut buffer = TextBuffer::from("print('hi')\n");
        buffer.insert(0, "# greet\n").unwrap();
        buffer.save_as(&path).unwrap();

        assert!(!buffer.is_modified());
        assert_eq!(buffer.file_path(), Some(path.as_path()));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# greet\nprint('hi')\n"
        );
    }

    #[test]
    fn test_save_leaves_sibling_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        let sibling = dir.path().join("main.tmp");
        std::fs::write(&sibling, "user data").unwrap();

        let mut buffer = TextBuffer::from("x = 1\n");
        buffer.save_as(&path).unwrap();
        buffer.insert(0, "# top\n").unwrap();
        buffer.save().unwrap();

        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "user data");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# top\nx = 1\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("main.py");
        let mut buffer = TextBuffer::from("x = 1");
        assert!(matches!(buffer.save_as(&path), Err(BufferError::Io(_))));
        assert!(buffer.file_path().is_none());
    }

    #[test]
    fn test_delete_joining_carriage_return_and_newline() {
        // "X" sits between a lone `\r` and a `\n`; removing it turns the two
        // breaks into one CRLF
        let mut buffer = TextBuffer::from("a = 1\rX\n# c\nprint(1)");
        assert_eq!(buffer.len_lines(), 4);

        let delta = buffer.delete(6..7).unwrap();
        assert_eq!(delta, LineDelta::new(1, 1, 0));
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line_content(0).unwrap(), "a = 1");
        assert_eq!(buffer.line_content(1).unwrap(), "# c");

        let undone = buffer.undo().unwrap();
        assert_eq!(undone.line_count_change(), 1);
        assert_eq!(buffer.len_lines(), 4);
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut buffer = TextBuffer::from("x");
        assert!(matches!(buffer.save(), Err(BufferError::NoFilePath)));
    }
}
