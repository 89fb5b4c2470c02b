//! # Qwerty Core
//!
//! Editor state around the highlighter.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                       Editor                         │
//! │  ┌──────────┐ ┌──────────┐ ┌────────┐ ┌───────────┐  │
//! │  │  Config  │ │  Gutter  │ │ Runner │ │ Event Bus │  │
//! │  └──────────┘ └──────────┘ └────────┘ └───────────┘  │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ Document: TextBuffer + HighlightDriver         │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs on the thread that owns the editing surface, except
//! the file runner, which hands the interpreter process to a tokio task.

pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod gutter;
pub mod runner;

pub use config::Config;
pub use document::{Document, DocumentWarning};
pub use editor::Editor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use gutter::{
    GlyphMetrics, GutterLabel, GutterRenderer, GutterState, GutterUpdate, LineExtent,
    MonospaceMetrics, Viewport,
};
pub use runner::{RunHandle, RunOutcome, Runner};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No open document")]
    NoActiveDocument,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Not a runnable file: {0}")]
    NotRunnable(String),

    #[error("No async runtime available to run files")]
    NoRuntime,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] qwerty_buffer::BufferError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] qwerty_syntax::SyntaxError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
