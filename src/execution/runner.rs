//! External command execution
//!
//! Every command runs once. A missing executable or a non-zero exit is a
//! [`PipelineError`] that the caller propagates to abort the run.

use crate::execution::PipelineError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// How a command's output is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Buffer stdout/stderr; only surfaced when the command fails
    Capture,
    /// Forward each line to the output sink as it arrives
    ///
    /// stdout and stderr are read concurrently: each keeps its own line
    /// order, but lines from the two pipes may interleave differently than
    /// the child wrote them.
    Stream,
}

/// A command line plus its working directory and redirections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// File connected to the child's stdin
    pub stdin_file: Option<PathBuf>,
    /// File the child's stdout is written to
    pub stdout_file: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stdin_file: None,
            stdout_file: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_file = Some(path.into());
        self
    }

    pub fn stdout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(path.into());
        self
    }

    /// File name of the program, without directories
    pub fn program_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }

    /// Shell-like rendering for logs
    pub fn display(&self) -> String {
        let mut rendered = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(path) = &self.stdin_file {
            rendered.push_str(&format!(" < {}", path.display()));
        }
        if let Some(path) = &self.stdout_file {
            rendered.push_str(&format!(" > {}", path.display()));
        }
        rendered
    }

    /// Build the tokio command, opening redirection files
    fn to_command(&self) -> Result<Command, PipelineError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            // Spawning in a missing directory reports NotFound, which would
            // read as a missing executable
            if !dir.is_dir() {
                return Err(PipelineError::io(
                    format!("Working directory {} does not exist", dir.display()),
                    io::Error::from(io::ErrorKind::NotFound),
                ));
            }
            command.current_dir(dir);
        }

        if let Some(path) = &self.stdin_file {
            let file = std::fs::File::open(path).map_err(|e| {
                PipelineError::io(format!("Failed to open {}", path.display()), e)
            })?;
            command.stdin(Stdio::from(file));
        }

        match &self.stdout_file {
            Some(path) => {
                let file = std::fs::File::create(path).map_err(|e| {
                    PipelineError::io(format!("Failed to create {}", path.display()), e)
                })?;
                command.stdout(Stdio::from(file));
            }
            None => {
                command.stdout(Stdio::piped());
            }
        }
        command.stderr(Stdio::piped());

        Ok(command)
    }
}

/// Receives streamed output lines
pub trait OutputSink: Send + Sync {
    /// Called once per line, without the trailing newline
    fn on_line(&self, line: &str);
}

/// Prints every line to stdout
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn on_line(&self, line: &str) {
        println!("{}", line);
    }
}

/// Runs external commands - allows substituting a scripted runner in tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec` to completion
    async fn run(&self, spec: &CommandSpec, mode: OutputMode) -> Result<(), PipelineError>;
}

/// Runs commands as child processes
#[derive(Clone)]
pub struct ProcessRunner {
    sink: Arc<dyn OutputSink>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(StdoutSink))
    }

    /// Stream output to `sink` instead of stdout
    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    async fn run_captured(&self, spec: &CommandSpec, child: Child) -> Result<(), PipelineError> {
        let output = child.wait_with_output().await.map_err(|e| {
            PipelineError::io(format!("Failed to wait for {}", spec.program_name()), e)
        })?;

        if output.status.success() {
            return Ok(());
        }

        let mut captured = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !captured.is_empty() {
                captured.push('\n');
            }
            captured.push_str(stderr.trim());
        }

        Err(failure(spec, output.status, captured))
    }

    async fn run_streamed(&self, spec: &CommandSpec, mut child: Child) -> Result<(), PipelineError> {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let sink = self.sink.as_ref();
        let (out, err) = tokio::join!(forward_lines(stdout, sink), forward_lines(stderr, sink));
        for result in [out, err] {
            if let Err(e) = result {
                warn!("Lost output from {}: {}", spec.program_name(), e);
            }
        }

        let status = child.wait().await.map_err(|e| {
            PipelineError::io(format!("Failed to wait for {}", spec.program_name()), e)
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(failure(spec, status, String::new()))
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner").finish_non_exhaustive()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec, mode: OutputMode) -> Result<(), PipelineError> {
        debug!("Running ({:?}): {}", mode, spec.display());
        let child = spawn(spec, &mut spec.to_command()?)?;

        let result = match mode {
            OutputMode::Capture => self.run_captured(spec, child).await,
            OutputMode::Stream => self.run_streamed(spec, child).await,
        };

        if let Err(e) = &result {
            debug!("Command {} failed: {}", spec.program_name(), e);
        }
        result
    }
}

fn spawn(spec: &CommandSpec, command: &mut Command) -> Result<Child, PipelineError> {
    command.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PipelineError::ToolMissing {
            program: spec.program.clone(),
        },
        _ => PipelineError::io(format!("Failed to start {}", spec.program_name()), e),
    })
}

fn failure(spec: &CommandSpec, status: ExitStatus, output: String) -> PipelineError {
    PipelineError::ToolFailed {
        program: spec.program_name().to_string(),
        code: status.code(),
        output,
    }
}

/// Forward lines from `stream` to `sink` until EOF; invalid UTF-8 is replaced
async fn forward_lines<R>(stream: Option<R>, sink: &dyn OutputSink) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(());
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        sink.on_line(line.trim_end_matches(['\r', '\n']));
    }
}
