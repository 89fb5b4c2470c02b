//! Running the current file through its interpreter.
//!
//! The interpreter runs as a child process on a tokio task, with the
//! editor's stdout and stderr inherited. [`Runner::spawn`] returns at once
//! with a [`RunHandle`]. Dropping the handle detaches the run: the process
//! keeps going and its outcome is only logged.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::config::RunnerConfig;
use crate::event::{EditorEvent, EventBus};
use crate::{CoreError, CoreResult};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited; `code` is `None` if it was killed by a signal
    Exited { code: Option<i32>, success: bool },
    /// The interpreter could not be started
    FailedToStart(String),
    /// Waiting on the process failed
    Lost(String),
    /// The run was cancelled through its handle
    Cancelled,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Exited { success: true, .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Exited {
                code: Some(code), ..
            } => write!(f, "exited with code {code}"),
            RunOutcome::Exited { code: None, .. } => write!(f, "terminated by signal"),
            RunOutcome::FailedToStart(e) => write!(f, "failed to start: {e}"),
            RunOutcome::Lost(e) => write!(f, "lost track of process: {e}"),
            RunOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Starts interpreter processes.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Interpreter for a file, preferring the configured one.
    pub fn interpreter<'a>(&'a self, default: &'a str) -> &'a str {
        self.config.interpreter.as_deref().unwrap_or(default)
    }

    /// Runs `path` with the configured interpreter, or `default_interpreter`.
    ///
    /// Must be called from within a tokio runtime. Failures to start the
    /// interpreter are reported through the handle, not as errors here.
    pub fn spawn(
        &self,
        path: &Path,
        default_interpreter: &str,
        events: Option<EventBus>,
    ) -> CoreResult<RunHandle> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;

        let interpreter = self.interpreter(default_interpreter).to_string();
        let mut command = Command::new(&interpreter);
        command.args(&self.config.args).arg(path);

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let path = path.to_path_buf();

        tracing::info!(interpreter = %interpreter, path = %path.display(), "Running file");
        runtime.spawn({
            let path = path.clone();
            async move {
                let outcome = supervise(command, cancel_rx, &path, events.as_ref()).await;
                match &outcome {
                    RunOutcome::Exited { success: true, .. } => {
                        tracing::info!(path = %path.display(), "Run finished: {}", outcome)
                    }
                    RunOutcome::Cancelled => {
                        tracing::info!(path = %path.display(), "Run cancelled")
                    }
                    _ => tracing::warn!(path = %path.display(), "Run failed: {}", outcome),
                }
                if let Some(events) = &events {
                    events.emit(EditorEvent::RunFinished(outcome.clone()));
                }
                // The handle may have been dropped
                let _ = outcome_tx.send(outcome);
            }
        });

        Ok(RunHandle {
            path,
            outcome: outcome_rx,
            cancel: Some(cancel_tx),
            finished: None,
        })
    }
}

async fn supervise(
    mut command: Command,
    mut cancel: oneshot::Receiver<()>,
    path: &Path,
    events: Option<&EventBus>,
) -> RunOutcome {
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return RunOutcome::FailedToStart(e.to_string()),
    };
    if let Some(events) = events {
        events.emit(EditorEvent::RunStarted(path.to_path_buf()));
    }

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => RunOutcome::Exited {
                code: status.code(),
                success: status.success(),
            },
            Err(e) => RunOutcome::Lost(e.to_string()),
        },
        // A dropped handle closes the channel and disables this branch
        Ok(()) = &mut cancel => {
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill interpreter: {}", e);
            }
            RunOutcome::Cancelled
        }
    }
}

/// Supervision handle for one run.
#[derive(Debug)]
pub struct RunHandle {
    path: PathBuf,
    outcome: oneshot::Receiver<RunOutcome>,
    cancel: Option<oneshot::Sender<()>>,
    finished: Option<RunOutcome>,
}

impl RunHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the outcome if the run has ended, without waiting.
    pub fn try_outcome(&mut self) -> Option<RunOutcome> {
        if self.finished.is_none() {
            match self.outcome.try_recv() {
                Ok(outcome) => self.finished = Some(outcome),
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.finished = Some(RunOutcome::Lost("runner task ended".to_string()))
                }
            }
        }
        self.finished.clone()
    }

    /// Waits for the run to end.
    pub async fn wait(mut self) -> RunOutcome {
        if let Some(outcome) = self.finished.take() {
            return outcome;
        }
        match (&mut self.outcome).await {
            Ok(outcome) => outcome,
            Err(_) => RunOutcome::Lost("runner task ended".to_string()),
        }
    }

    /// Asks the runner to kill the process. Has no effect once it ended.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}
