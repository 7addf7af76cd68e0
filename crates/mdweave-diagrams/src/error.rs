//! Diagram rendering errors.
//!
//! Both types are recoverable: the diagram filter turns them into warnings
//! and leaves the code block in place.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// External renderer failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The renderer command is empty.
    #[error("renderer command is empty")]
    EmptyCommand,
    /// The process could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    /// The process exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    /// The process ran past its timeout and was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    /// The process succeeded but the artifact is missing.
    #[error("renderer produced no output at {}", .0.display())]
    MissingOutput(PathBuf),
    /// I/O error while supervising the process.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure producing one diagram artifact.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// Artifact store error.
    #[error("artifact store error: {0}")]
    Store(#[from] io::Error),
    /// Renderer error.
    #[error(transparent)]
    Render(#[from] RenderError),
}
