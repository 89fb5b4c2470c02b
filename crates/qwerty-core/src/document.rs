//! Documents: a text buffer with its highlighting state.
//!
//! Every mutation goes through [`Document`] so the highlighter sees each
//! line delta exactly once.

use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

use qwerty_buffer::{LineDelta, Position, TextBuffer};
use qwerty_syntax::{HighlightDriver, Span, StyledSpan};

use crate::{CoreError, CoreResult};

/// Problems found while loading a document that did not stop it loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentWarning {
    #[error("{} has {} line(s) that are not valid UTF-8", path.display(), lines.len())]
    MalformedInput { path: PathBuf, lines: Vec<usize> },
}

/// A single file or scratch buffer being edited.
pub struct Document {
    buffer: TextBuffer,

    /// File path (None for scratch documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Lowercased file extension, used to pick a highlighter
    file_type: Option<String>,

    highlighter: HighlightDriver,

    /// Whether highlighting may be installed at all
    highlighting: bool,

    warnings: Vec<DocumentWarning>,
}

impl Document {
    /// Opens a document from a file.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; the lines
    /// holding them are left unhighlighted and reported as a warning.
    pub fn open(
        path: impl AsRef<Path>,
        highlighter: HighlightDriver,
        highlighting: bool,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CoreError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let (text, lossy) = match String::from_utf8_lossy(&bytes) {
            Cow::Borrowed(text) => (text.to_string(), false),
            Cow::Owned(text) => (text, true),
        };
        let buffer = TextBuffer::from(text).with_path(path);

        // Found before the highlighter is installed so it never classifies them
        let malformed: Vec<usize> = if lossy {
            buffer
                .lines()
                .enumerate()
                .filter(|(_, line)| line.contains(char::REPLACEMENT_CHARACTER))
                .map(|(idx, _)| idx)
                .collect()
        } else {
            Vec::new()
        };

        let mut doc = Self {
            buffer,
            path: Some(path.to_path_buf()),
            name: display_name(path),
            file_type: file_type_of(path),
            highlighter,
            highlighting,
            warnings: Vec::new(),
        };
        doc.install_highlighter(&malformed);

        if lossy {
            tracing::warn!(
                path = %path.display(),
                lines = malformed.len(),
                "File is not valid UTF-8, skipping highlighting of affected lines"
            );
            doc.warnings.push(DocumentWarning::MalformedInput {
                path: path.to_path_buf(),
                lines: malformed,
            });
        }

        tracing::info!(path = %path.display(), lines = doc.len_lines(), "Opened document");
        Ok(doc)
    }

    /// Creates a scratch document. `file_type` is an extension such as `"py"`.
    pub fn from_text(
        text: &str,
        file_type: Option<&str>,
        highlighter: HighlightDriver,
        highlighting: bool,
    ) -> Self {
        let mut doc = Self {
            buffer: TextBuffer::from(text),
            path: None,
            name: "Untitled".to_string(),
            file_type: file_type.map(|ext| ext.trim_start_matches('.').to_ascii_lowercase()),
            highlighter,
            highlighting,
            warnings: Vec::new(),
        };
        doc.install_highlighter(&[]);
        doc
    }

    fn install_highlighter(&mut self, malformed: &[usize]) {
        let file_type = self.file_type.as_deref().filter(|_| self.highlighting);
        self.highlighter.on_file_opened_skipping(file_type, &self.buffer, malformed);
    }

    /// Feeds an edit's delta to the highlighter.
    ///
    /// Only a 1/1 delta over a cache that matches the document is handled
    /// as an in-place edit.
    fn rehighlight(&mut self, delta: LineDelta) {
        let in_sync = self.highlighter.len() == self.buffer.len_lines();
        if delta.removed == 1 && delta.inserted == 1 && in_sync {
            self.highlighter.on_block_changed(delta.start, &self.buffer);
        } else {
            self.highlighter.on_lines_replaced(delta, &self.buffer);
        }
    }

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> CoreResult<LineDelta> {
        let delta = self.buffer.insert(char_idx, text)?;
        self.rehighlight(delta);
        Ok(delta)
    }

    /// Inserts text at a line/column position.
    pub fn insert_at(&mut self, pos: Position, text: &str) -> CoreResult<LineDelta> {
        let delta = self.buffer.insert_at(pos, text)?;
        self.rehighlight(delta);
        Ok(delta)
    }

    /// Deletes a character range.
    pub fn delete(&mut self, range: Range<usize>) -> CoreResult<LineDelta> {
        let delta = self.buffer.delete(range)?;
        self.rehighlight(delta);
        Ok(delta)
    }

    /// Replaces a character range with new text.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> CoreResult<LineDelta> {
        let delta = self.buffer.replace(range, text)?;
        self.rehighlight(delta);
        Ok(delta)
    }

    /// Replaces the content of one line, keeping its line break.
    pub fn set_line(&mut self, line: usize, text: &str) -> CoreResult<LineDelta> {
        let delta = self.buffer.set_line(line, text)?;
        self.rehighlight(delta);
        Ok(delta)
    }

    pub fn undo(&mut self) -> CoreResult<LineDelta> {
        let delta = self.buffer.undo()?;
        self.rehighlight(delta);
        Ok(delta)
    }

    pub fn redo(&mut self) -> CoreResult<LineDelta> {
        let delta = self.buffer.redo()?;
        self.rehighlight(delta);
        Ok(delta)
    }

    /// Saves to the document's path.
    pub fn save(&mut self) -> CoreResult<()> {
        self.buffer.save()?;
        tracing::info!(name = %self.name, "Saved document");
        Ok(())
    }

    /// Saves under a new path. Highlighting follows the new extension.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.buffer.save_as(path)?;

        let file_type = file_type_of(path);
        self.name = display_name(path);
        self.path = Some(path.to_path_buf());
        if file_type != self.file_type {
            self.file_type = file_type;
            self.install_highlighter(&[]);
        }
        tracing::info!(path = %path.display(), "Saved document");
        Ok(())
    }

    /// Drops all highlighting results.
    pub fn close(&mut self) {
        self.highlighter.on_closed();
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn len_lines(&self) -> usize {
        self.buffer.len_lines()
    }

    pub fn line(&self, line: usize) -> CoreResult<Cow<'_, str>> {
        Ok(self.buffer.line_content(line)?)
    }

    pub fn highlighter(&self) -> &HighlightDriver {
        &self.highlighter
    }

    /// Name of the language highlighting this document, if any.
    pub fn language(&self) -> Option<&str> {
        self.highlighter.language()
    }

    pub fn spans(&self, line: usize) -> &[Span] {
        self.highlighter.spans(line)
    }

    pub fn styled(&self, line: usize) -> impl Iterator<Item = StyledSpan<'_>> + '_ {
        self.highlighter.styled(line)
    }

    pub fn warnings(&self) -> &[DocumentWarning] {
        &self.warnings
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Unknown")
        .to_string()
}

fn file_type_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
