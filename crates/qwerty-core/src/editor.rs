//! Main editor orchestration.
//!
//! `Editor` is the facade a host talks to. It owns the open document and
//! keeps the gutter, the event bus and the runner in step with it.

use std::path::Path;
use std::sync::Arc;

use qwerty_buffer::{LineDelta, Position};
use qwerty_syntax::{HighlightDriver, LanguageRegistry, Theme};

use crate::config::Config;
use crate::document::Document;
use crate::event::{EditorEvent, EventBus};
use crate::gutter::{self, GutterLabel, GutterRenderer, GutterState, MonospaceMetrics, Viewport};
use crate::runner::{RunHandle, Runner};
use crate::{CoreError, CoreResult};

/// The main editor state.
///
/// Owned by the thread that drives the editing surface. Runs are the only
/// work that leaves that thread.
pub struct Editor {
    config: Config,

    /// Compiled classifiers, shared by every document
    registry: Arc<LanguageRegistry>,

    theme: Theme,

    /// The open document, if any
    document: Option<Document>,

    gutter: GutterRenderer,

    metrics: MonospaceMetrics,

    runner: Runner,

    event_bus: EventBus,
}

impl Editor {
    /// Creates an editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let metrics = MonospaceMetrics::from(&config.gutter);
        let mut gutter = GutterRenderer::new(&config.gutter);
        gutter.set_line_count(0, &metrics);

        Self {
            registry: Arc::new(LanguageRegistry::with_defaults()),
            theme: config.theme(),
            runner: Runner::new(config.runner.clone()),
            document: None,
            gutter,
            metrics,
            event_bus: EventBus::new(),
            config,
        }
    }

    // ==================== Document Operations ====================

    /// Opens a file, replacing the current document.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> CoreResult<&Document> {
        let path = path.as_ref();
        let doc = Document::open(path, self.highlighter(), self.config.editor.highlighting)?;
        self.install(doc, Some(path));
        self.document()
    }

    /// Opens a scratch document with the given text.
    pub fn open_text(&mut self, text: &str, file_type: Option<&str>) -> &Document {
        let doc = Document::from_text(
            text,
            file_type,
            self.highlighter(),
            self.config.editor.highlighting,
        );
        self.install(doc, None)
    }

    fn highlighter(&self) -> HighlightDriver {
        HighlightDriver::new(self.registry.clone(), self.theme.clone())
    }

    fn install(&mut self, doc: Document, path: Option<&Path>) -> &Document {
        if self.document.is_some() {
            self.close_document();
        }

        let line_count = doc.len_lines();
        if let Some(path) = path {
            self.emit(EditorEvent::DocumentOpened {
                path: path.to_path_buf(),
                highlighted: doc.language().is_some(),
            });
        }
        self.update_gutter(line_count);
        self.document.insert(doc)
    }

    /// Closes the current document. Does nothing if none is open.
    pub fn close_document(&mut self) {
        if let Some(mut doc) = self.document.take() {
            doc.close();
            tracing::debug!(name = doc.name(), "Closed document");
            self.emit(EditorEvent::DocumentClosed);
            self.update_gutter(0);
        }
    }

    /// Saves the current document.
    pub fn save(&mut self) -> CoreResult<()> {
        let doc = self.document_mut()?;
        doc.save()?;
        if let Some(path) = doc.path().map(Path::to_path_buf) {
            self.emit(EditorEvent::DocumentSaved(path));
        }
        Ok(())
    }

    /// Saves the current document to a new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        self.document_mut()?.save_as(path)?;
        self.emit(EditorEvent::DocumentSaved(path.to_path_buf()));
        Ok(())
    }

    /// Returns the open document.
    pub fn document(&self) -> CoreResult<&Document> {
        self.document.as_ref().ok_or(CoreError::NoActiveDocument)
    }

    fn document_mut(&mut self) -> CoreResult<&mut Document> {
        self.document.as_mut().ok_or(CoreError::NoActiveDocument)
    }

    // ==================== Text Editing ====================

    pub fn insert(&mut self, char_idx: usize, text: &str) -> CoreResult<LineDelta> {
        self.edit(|doc| doc.insert(char_idx, text))
    }

    pub fn insert_at(&mut self, pos: Position, text: &str) -> CoreResult<LineDelta> {
        self.edit(|doc| doc.insert_at(pos, text))
    }

    pub fn delete(&mut self, range: std::ops::Range<usize>) -> CoreResult<LineDelta> {
        self.edit(|doc| doc.delete(range))
    }

    pub fn replace(&mut self, range: std::ops::Range<usize>, text: &str) -> CoreResult<LineDelta> {
        self.edit(|doc| doc.replace(range, text))
    }

    pub fn set_line(&mut self, line: usize, text: &str) -> CoreResult<LineDelta> {
        self.edit(|doc| doc.set_line(line, text))
    }

    /// Undoes the last action.
    pub fn undo(&mut self) -> CoreResult<LineDelta> {
        self.edit(Document::undo)
    }

    /// Redoes the last undone action.
    pub fn redo(&mut self) -> CoreResult<LineDelta> {
        self.edit(Document::redo)
    }

    fn edit<F>(&mut self, f: F) -> CoreResult<LineDelta>
    where
        F: FnOnce(&mut Document) -> CoreResult<LineDelta>,
    {
        let doc = self.document_mut()?;
        let delta = f(doc)?;
        let line_count = doc.len_lines();

        self.emit(EditorEvent::LinesChanged(delta));
        if !delta.is_in_place() {
            self.update_gutter(line_count);
        }
        Ok(delta)
    }

    // ==================== Running ====================

    /// Runs the current file through its language's interpreter.
    ///
    /// Only saved files of a known language can run. The file on disk is
    /// what runs, so unsaved edits are not seen by the interpreter.
    pub fn run_current(&self) -> CoreResult<RunHandle> {
        let doc = self.document()?;
        let path = doc
            .path()
            .ok_or_else(|| CoreError::NotRunnable(doc.name().to_string()))?;
        let language = doc
            .file_type()
            .and_then(|ext| qwerty_syntax::find_language(ext).ok())
            .ok_or_else(|| CoreError::NotRunnable(doc.name().to_string()))?;

        if doc.is_modified() {
            tracing::warn!(name = doc.name(), "Running the saved version of a modified file");
        }
        self.runner
            .spawn(path, language.interpreter, Some(self.event_bus.clone()))
    }

    // ==================== Gutter ====================

    /// Replaces the font metrics used for the gutter and tab stops.
    pub fn set_metrics(&mut self, metrics: MonospaceMetrics) {
        self.metrics = metrics;
        self.update_gutter(self.gutter.line_count());
    }

    fn update_gutter(&mut self, line_count: usize) {
        if let Some(width) = self.gutter.set_line_count(line_count, &self.metrics) {
            if self.config.gutter.visible {
                self.emit(EditorEvent::GutterWidthChanged(width));
            }
        }
    }

    /// Gutter width; zero when the gutter is hidden.
    pub fn gutter_width(&self) -> f32 {
        if self.config.gutter.visible {
            self.gutter.width()
        } else {
            0.0
        }
    }

    /// Line numbers for `visible` lines starting at `first_visible`.
    pub fn gutter_labels(&self, first_visible: usize, visible: usize) -> Vec<GutterLabel> {
        if !self.config.gutter.visible {
            return Vec::new();
        }
        let line_height = self.metrics.line_height;
        let state = GutterState::uniform(
            self.gutter.line_count(),
            first_visible,
            visible,
            line_height,
            0.0,
        );
        let viewport = Viewport::new(0.0, visible as f32 * line_height);
        self.gutter.paint(viewport, &state, &self.metrics)
    }

    pub fn gutter(&self) -> &GutterRenderer {
        &self.gutter
    }

    /// Distance between tab stops in the current metrics.
    pub fn tab_stop_distance(&self) -> f32 {
        gutter::tab_stop_distance(&self.metrics, self.config.editor.tab_width)
    }

    // ==================== Configuration ====================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.event_bus.subscribe()
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunOutcome;
    use qwerty_syntax::Category;
    use tokio::sync::broadcast::error::TryRecvError;

    fn cells_editor() -> Editor {
        let mut editor = Editor::new();
        editor.set_metrics(MonospaceMetrics::cells());
        editor
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<EditorEvent>) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    #[test]
    fn test_new_editor() {
        let editor = Editor::new();
        assert!(editor.document().is_err());
        assert_eq!(editor.registry().languages(), vec!["python"]);
    }

    #[test]
    fn test_open_file_emits_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "import os\n").unwrap();

        let mut editor = Editor::new();
        let mut rx = editor.subscribe();
        let doc = editor.open_file(&path).unwrap();
        assert_eq!(doc.spans(0)[0].category, Category::Keyword);

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            EditorEvent::DocumentOpened { highlighted: true, .. }
        )));
    }

    #[test]
    fn test_edits_without_document() {
        let mut editor = Editor::new();
        assert!(matches!(editor.insert(0, "x"), Err(CoreError::NoActiveDocument)));
        assert!(matches!(editor.run_current(), Err(CoreError::NoActiveDocument)));
    }

    #[test]
    fn test_gutter_grows_with_document() {
        let mut editor = cells_editor();
        let text = vec!["x = 1"; 9].join("\n");
        editor.open_text(&text, Some("py"));
        assert_eq!(editor.gutter_width(), 11.0);

        let mut rx = editor.subscribe();
        editor.insert(0, "y = 2\n").unwrap();
        assert_eq!(editor.gutter_width(), 12.0);

        let events = drain(&mut rx);
        assert!(matches!(events[0], EditorEvent::LinesChanged(_)));
        assert!(matches!(events[1], EditorEvent::GutterWidthChanged(w) if w == 12.0));
    }

    #[test]
    fn test_in_place_edit_keeps_gutter() {
        let mut editor = cells_editor();
        editor.open_text("x = 1\ny = 2", Some("py"));

        let mut rx = editor.subscribe();
        editor.set_line(1, "def y(): pass").unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(
            editor.document().unwrap().spans(1)[1].category,
            Category::Definition
        );
    }

    #[test]
    fn test_gutter_labels() {
        let mut editor = cells_editor();
        let text = vec!["pass"; 20].join("\n");
        editor.open_text(&text, Some("py"));

        let labels = editor.gutter_labels(9, 3);
        let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["10", "11", "12"]);
        assert_eq!(labels[0].x, editor.gutter_width() - 5.0 - 2.0);
    }

    #[test]
    fn test_hidden_gutter() {
        let mut config = Config::default();
        config.gutter.visible = false;
        let mut editor = Editor::with_config(config);
        editor.open_text("x = 1", Some("py"));
        assert_eq!(editor.gutter_width(), 0.0);
        assert!(editor.gutter_labels(0, 10).is_empty());
    }

    #[test]
    fn test_tab_stop_distance() {
        let mut editor = Editor::new();
        editor.set_metrics(MonospaceMetrics::new(7.0, 14.0));
        assert_eq!(editor.tab_stop_distance(), 28.0);
    }

    #[test]
    fn test_close_document() {
        let mut editor = Editor::new();
        editor.open_text("x = 1", Some("py"));
        let mut rx = editor.subscribe();
        editor.close_document();
        assert!(editor.document().is_err());
        assert!(matches!(drain(&mut rx)[0], EditorEvent::DocumentClosed));
    }

    #[test]
    fn test_scratch_document_is_not_runnable() {
        let mut editor = Editor::new();
        editor.open_text("print(1)", Some("py"));
        assert!(matches!(editor.run_current(), Err(CoreError::NotRunnable(_))));
    }

    #[test]
    fn test_non_python_file_is_not_runnable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut editor = Editor::new();
        editor.open_file(&path).unwrap();
        assert!(matches!(editor.run_current(), Err(CoreError::NotRunnable(_))));
    }

    #[test]
    fn test_highlighting_can_be_disabled() {
        let mut config = Config::default();
        config.editor.highlighting = false;
        let mut editor = Editor::with_config(config);
        let doc = editor.open_text("x = 1", Some("py"));
        assert!(doc.spans(0).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_current_uses_configured_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.py");
        std::fs::write(&path, "print('hi')\n").unwrap();

        let mut config = Config::default();
        config.runner.interpreter = Some("true".to_string());
        let mut editor = Editor::with_config(config);
        editor.open_file(&path).unwrap();

        let handle = editor.run_current().unwrap();
        assert_eq!(handle.path(), path.as_path());
        assert!(matches!(
            handle.wait().await,
            RunOutcome::Exited { success: true, .. }
        ));
    }
}
