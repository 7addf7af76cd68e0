//! External renderer invocation.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{DEFAULT_MERMAID_SCALE, DEFAULT_TIMEOUT, POLL_INTERVAL};
use crate::error::RenderError;
use crate::kind::{ArtifactFormat, RendererKind};

/// One render job: turn the staged source into the artifact at `output`.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Staged source file.
    pub source: &'a Path,
    /// Where the artifact must appear. Shares the source's file stem.
    pub output: &'a Path,
    /// Requested artifact format.
    pub format: ArtifactFormat,
}

/// Renders staged diagram sources.
pub trait DiagramRenderer {
    /// Produce `req.output` from `req.source`.
    fn render(&self, req: &RenderRequest<'_>) -> Result<(), RenderError>;
}

/// [`DiagramRenderer`] running an external command.
///
/// - flow chart: `<bin> -i <source> -o <output> --scale <N>`
/// - UML: `<command words...> -t<format> <source>`; the tool writes its
///   output next to the source
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    kind: RendererKind,
    command: Vec<String>,
    scale: u32,
    timeout: Option<Duration>,
}

impl CommandRenderer {
    /// Mermaid CLI renderer.
    #[must_use]
    pub fn mermaid(bin: impl Into<String>) -> Self {
        Self::new(RendererKind::FlowChart, vec![bin.into()])
    }

    /// `PlantUML` renderer. `command` is split on whitespace, so
    /// `java -jar plantuml.jar` works.
    #[must_use]
    pub fn plantuml(command: &str) -> Self {
        Self::new(
            RendererKind::Uml,
            command.split_whitespace().map(str::to_owned).collect(),
        )
    }

    fn new(kind: RendererKind, command: Vec<String>) -> Self {
        Self {
            kind,
            command,
            scale: DEFAULT_MERMAID_SCALE,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the flow chart scale factor (default: 4). Ignored for UML.
    #[must_use]
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the per-invocation timeout (default: 120 seconds). `None`
    /// waits indefinitely.
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the process invocation for `req`.
    pub fn command(&self, req: &RenderRequest<'_>) -> Result<Command, RenderError> {
        let (program, args) = self.command.split_first().ok_or(RenderError::EmptyCommand)?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        match self.kind {
            RendererKind::FlowChart => {
                cmd.arg("-i")
                    .arg(req.source)
                    .arg("-o")
                    .arg(req.output)
                    .arg("--scale")
                    .arg(self.scale.to_string());
            }
            RendererKind::Uml => {
                cmd.arg(format!("-t{}", req.format.as_str())).arg(req.source);
            }
        }
        Ok(cmd)
    }

    fn program(&self) -> String {
        self.command.join(" ")
    }
}

impl DiagramRenderer for CommandRenderer {
    fn render(&self, req: &RenderRequest<'_>) -> Result<(), RenderError> {
        let mut cmd = self.command(req)?;
        let mut stderr = tempfile::tempfile()?;

        tracing::debug!("running {cmd:?}");
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(stderr.try_clone()?)
            .spawn()
            .map_err(|source| RenderError::Launch {
                program: self.program(),
                source,
            })?;

        let Some(status) = wait(&mut child, self.timeout)? else {
            return Err(RenderError::TimedOut {
                program: self.program(),
                timeout: self.timeout.unwrap_or_default(),
            });
        };
        if status.success() {
            return Ok(());
        }
        Err(RenderError::Failed {
            program: self.program(),
            status,
            stderr: read_captured(&mut stderr),
        })
    }
}

/// Wait for `child`, killing it once `timeout` elapses. `None` on timeout.
fn wait(child: &mut Child, timeout: Option<Duration>) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_captured(file: &mut File) -> String {
    let mut text = String::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_string(&mut text);
    }
    text.trim().to_owned()
}
