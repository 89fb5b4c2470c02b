//! # Qwerty Buffer
//!
//! Line-indexed text buffer backed by a rope.
//!
//! Every mutation reports a [`LineDelta`]: the range of lines it replaced and
//! how many lines took their place. Consumers that keep per-line state (the
//! syntax highlighter, the gutter) use it to touch only the lines an edit
//! actually affected.

mod buffer;
mod delta;
mod history;
mod position;

pub use buffer::TextBuffer;
pub use delta::LineDelta;
pub use history::{Edit, EditKind, History};
pub use position::Position;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Line {0} is out of bounds")]
    LineOutOfBounds(usize),

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("No file path set")]
    NoFilePath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
