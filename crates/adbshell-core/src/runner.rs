// ── Process runner ──
//
// Launches external commands and streams their output to the console
// line by line as it arrives. Success is decided by a pluggable
// `OutcomeClassifier`; a non-zero exit status alone is not a failure
// unless the classifier says so.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CoreError;

// ── Invocation ───────────────────────────────────────────────────────

/// Host command interpreter used for passthrough commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpreter {
    /// `cmd /C` on Windows, `sh -c` elsewhere.
    Cmd,
    /// `powershell -Command` on Windows, `pwsh -Command` elsewhere.
    PowerShell,
}

impl Interpreter {
    fn program_and_flags(self) -> (&'static str, &'static [&'static str]) {
        const CMD_FLAGS: &[&str] = &["/C"];
        const SH_FLAGS: &[&str] = &["-c"];
        const PWSH_FLAGS: &[&str] = &["-NoProfile", "-Command"];

        match self {
            Self::Cmd if cfg!(windows) => ("cmd", CMD_FLAGS),
            Self::Cmd => ("sh", SH_FLAGS),
            Self::PowerShell if cfg!(windows) => ("powershell", PWSH_FLAGS),
            Self::PowerShell => ("pwsh", PWSH_FLAGS),
        }
    }
}

/// One external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Arguments for the wrapped adb executable.
    Tool(Vec<String>),
    /// A command line handed to a host interpreter untouched.
    System {
        interpreter: Interpreter,
        command: String,
    },
}

impl Invocation {
    pub fn tool<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tool(args.into_iter().map(Into::into).collect())
    }

    fn to_command(&self, adb: &Path) -> (String, Command) {
        match self {
            Self::Tool(args) => {
                let mut command = Command::new(adb);
                command.args(args);
                (adb.display().to_string(), command)
            }
            Self::System {
                interpreter,
                command: line,
            } => {
                let (program, flags) = interpreter.program_and_flags();
                let mut command = Command::new(program);
                command.args(flags).arg(line);
                (program.to_owned(), command)
            }
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tool(args) => write!(f, "adb {}", shell_words::join(args)),
            Self::System {
                interpreter,
                command,
            } => {
                let (program, flags) = interpreter.program_and_flags();
                write!(f, "{program} {} {command}", flags.join(" "))
            }
        }
    }
}

// ── Outcome classification ───────────────────────────────────────────

/// Decides whether a finished run counts as a success.
pub trait OutcomeClassifier: Send + Sync + fmt::Debug {
    /// Inspect one emitted line. Returning `true` marks the run failed.
    fn line_failed(&self, _line: &str) -> bool {
        false
    }

    /// Inspect the exit status. Returning `true` marks the run failed.
    fn exit_failed(&self, _status: ExitStatus) -> bool {
        false
    }
}

/// Fails a run when any line contains "cannot" (case-insensitive), which
/// is how adb phrases most connection errors. Ignores exit status.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputTextClassifier;

impl OutcomeClassifier for OutputTextClassifier {
    fn line_failed(&self, line: &str) -> bool {
        line.to_ascii_lowercase().contains("cannot")
    }
}

/// Fails a run on a non-zero exit status.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitStatusClassifier;

impl OutcomeClassifier for ExitStatusClassifier {
    fn exit_failed(&self, status: ExitStatus) -> bool {
        !status.success()
    }
}

/// Which classifier to use, as named in runtime options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessDetection {
    #[default]
    OutputText,
    ExitStatus,
}

impl SuccessDetection {
    pub fn classifier(self) -> Arc<dyn OutcomeClassifier> {
        match self {
            Self::OutputText => Arc::new(OutputTextClassifier),
            Self::ExitStatus => Arc::new(ExitStatusClassifier),
        }
    }
}

// ── Runner ───────────────────────────────────────────────────────────

/// Result of a streamed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl RunOutcome {
    pub fn failed() -> Self {
        Self {
            success: false,
            exit_code: None,
        }
    }
}

/// Runs invocations. Object-safe so the shell and the reporter can share
/// one runner and tests can swap in a recorder.
pub trait CommandRunner: Send + Sync {
    /// Run with output streamed to the console; never errors.
    fn run<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, RunOutcome>;

    /// Run silently and return stdout. Used for probes.
    fn capture<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, Result<String, CoreError>>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    adb: PathBuf,
    classifier: Arc<dyn OutcomeClassifier>,
}

impl ProcessRunner {
    pub fn new(adb: impl Into<PathBuf>, classifier: Arc<dyn OutcomeClassifier>) -> Self {
        Self {
            adb: adb.into(),
            classifier,
        }
    }

    async fn stream(&self, invocation: &Invocation) -> RunOutcome {
        let (program, mut command) = invocation.to_command(&self.adb);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(%invocation, "spawning");
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                eprintln!("An error occurred: could not run {program}: {e}");
                return RunOutcome::failed();
            }
        };

        let mut stdout = child.stdout.take().map(LossyLines::new);
        let mut stderr = child.stderr.take().map(LossyLines::new);
        let mut failed = false;

        while stdout.is_some() || stderr.is_some() {
            tokio::select! {
                line = next_line(&mut stdout), if stdout.is_some() => match line {
                    Some(line) => {
                        failed |= self.classifier.line_failed(&line);
                        println!("{line}");
                    }
                    None => stdout = None,
                },
                line = next_line(&mut stderr), if stderr.is_some() => match line {
                    Some(line) => {
                        failed |= self.classifier.line_failed(&line);
                        eprintln!("{line}");
                    }
                    None => stderr = None,
                },
            }
        }

        match child.wait().await {
            Ok(status) => {
                failed |= self.classifier.exit_failed(status);
                debug!(%status, failed, "process exited");
                RunOutcome {
                    success: !failed,
                    exit_code: status.code(),
                }
            }
            Err(e) => {
                eprintln!("An error occurred: {e}");
                RunOutcome::failed()
            }
        }
    }

    async fn capture_output(&self, invocation: &Invocation) -> Result<String, CoreError> {
        let (program, mut command) = invocation.to_command(&self.adb);
        let output = command
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CoreError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(CoreError::ToolFailed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

/// Line reader over raw bytes. Invalid UTF-8 is replaced, never treated
/// as the end of the stream, so a pipe is drained until EOF.
struct LossyLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// `read_until` keeps partial bytes in `buf` when cancelled by
    /// `select!`, so the buffer is only cleared once a line is complete.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let mut bytes = self.buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        let line = String::from_utf8_lossy(bytes).into_owned();
        self.buf.clear();
        Ok(Some(line))
    }
}

/// Read the next line. Only an I/O failure on the pipe itself ends the
/// stream early.
async fn next_line<R>(reader: &mut Option<LossyLines<R>>) -> Option<String>
where
    R: AsyncRead + Unpin,
{
    let lines = reader.as_mut()?;
    match lines.next_line().await {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "output stream read failed");
            None
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, RunOutcome> {
        Box::pin(self.stream(invocation))
    }

    fn capture<'a>(&'a self, invocation: &'a Invocation) -> BoxFuture<'a, Result<String, CoreError>> {
        Box::pin(self.capture_output(invocation))
    }
}
