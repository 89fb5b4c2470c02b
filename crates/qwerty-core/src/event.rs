//! Event system for editor notifications.
//!
//! Events are broadcast over a `tokio::sync::broadcast` channel. Emitting
//! never blocks, and a lagging subscriber only loses its own backlog.

use std::path::PathBuf;

use qwerty_buffer::LineDelta;
use tokio::sync::broadcast;

use crate::runner::RunOutcome;

/// Events that can occur in the editor.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A document was opened; `highlighted` is false for unknown file types
    DocumentOpened { path: PathBuf, highlighted: bool },
    /// The document was closed
    DocumentClosed,
    /// The document was written to disk
    DocumentSaved(PathBuf),
    /// Document lines were replaced
    LinesChanged(LineDelta),
    /// The gutter needs a new width
    GutterWidthChanged(f32),
    /// The interpreter was started for a file
    RunStarted(PathBuf),
    /// A run ended
    RunFinished(RunOutcome),
}

/// Event bus for broadcasting editor events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emits an event to all subscribers.
    pub fn emit(&self, event: EditorEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribes to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for processing events asynchronously.
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::RunFinished(outcome) = event {
///             println!("{outcome}");
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
