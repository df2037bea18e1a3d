//! Bounded external tool invocation.
//!
//! Every pipeline stage that shells out funnels through [`run_tool`]: spawn
//! the tool, feed it the input text, capture stdout/stderr, and enforce a
//! wall-clock deadline. All stage failure paths collapse into the single
//! [`ToolOutcome`] type, which keeps the pipeline's failure policy in one
//! place.

use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::Builder as TempFileBuilder;

/// Poll interval while waiting for a child process to exit.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Placeholder in an argument template replaced by the temp file path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// How a tool receives its input and yields its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Write the text to the child's stdin, read the result from stdout.
    Stdin,
    /// Write the text to a scoped temp file with the given suffix, pass its
    /// path in place of [`FILE_PLACEHOLDER`], and read the file back after
    /// the tool exits. The file is removed on every exit path.
    TempFile { suffix: String },
}

/// One external tool invocation: executable, argument template, I/O mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    pub program: String,
    pub args: Vec<String>,
    pub input: InputMode,
}

impl ToolSpec {
    /// Stdin-fed tool with a fixed argument list.
    #[must_use]
    pub fn stdin(program: &str, args: &[&str]) -> Self {
        ToolSpec {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            input: InputMode::Stdin,
        }
    }

    /// Temp-file-fed tool; `args` must contain [`FILE_PLACEHOLDER`].
    #[must_use]
    pub fn temp_file(program: &str, args: &[&str], suffix: &str) -> Self {
        ToolSpec {
            program: program.to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            input: InputMode::TempFile {
                suffix: suffix.to_string(),
            },
        }
    }

    /// Short name used in diagnostics and error kinds.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.program
    }
}

/// Terminal state of one tool invocation.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Tool exited zero; carries the formatted text.
    Success(String),
    /// The binary could not be spawned (missing or unusable).
    Unavailable,
    /// The deadline elapsed; the child was killed.
    TimedOut,
    /// Tool exited non-zero; carries its diagnostic verbatim.
    Rejected { diagnostic: String },
}

/// Run `spec` on `text` with a wall-clock budget of `timeout`.
///
/// Never panics and never returns partial output: a killed or failed child
/// maps to `TimedOut`/`Rejected`, a spawn failure to `Unavailable`.
#[must_use]
pub fn run_tool(spec: &ToolSpec, text: &str, timeout: Duration) -> ToolOutcome {
    match &spec.input {
        InputMode::Stdin => run_stdin_tool(spec, text, timeout),
        InputMode::TempFile { suffix } => run_temp_file_tool(spec, text, suffix, timeout),
    }
}

fn run_stdin_tool(spec: &ToolSpec, text: &str, timeout: Duration) -> ToolOutcome {
    let mut child = match Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        // ENOENT and every other spawn failure mean the same thing here:
        // the stage has no usable binary.
        Err(_) => return ToolOutcome::Unavailable,
    };

    // Feed stdin from its own thread; writing inline can deadlock once the
    // pipe buffer fills while the child is already producing output.
    let stdin = child.stdin.take();
    let input = text.to_string();
    let writer = thread::spawn(move || {
        if let Some(mut stdin) = stdin {
            let _ = stdin.write_all(input.as_bytes());
        }
        // Dropping stdin closes the pipe so the child sees EOF.
    });

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = match wait_with_deadline(&mut child, timeout) {
        Some(status) => status,
        None => {
            let _ = writer.join();
            drain_reader(stdout_reader);
            drain_reader(stderr_reader);
            return ToolOutcome::TimedOut;
        }
    };

    let _ = writer.join();
    let stdout = drain_reader(stdout_reader);
    let stderr = drain_reader(stderr_reader);

    if status.success() {
        ToolOutcome::Success(stdout)
    } else {
        failed_outcome(status, &stderr, &stdout)
    }
}

fn run_temp_file_tool(
    spec: &ToolSpec,
    text: &str,
    suffix: &str,
    timeout: Duration,
) -> ToolOutcome {
    // NamedTempFile removes itself on drop, covering every exit path below.
    let mut file = match TempFileBuilder::new().suffix(suffix).tempfile() {
        Ok(file) => file,
        Err(_) => return ToolOutcome::Unavailable,
    };
    if file.write_all(text.as_bytes()).is_err() || file.flush().is_err() {
        return ToolOutcome::Unavailable;
    }

    let path = file.path().to_string_lossy().into_owned();
    let args: Vec<String> = spec
        .args
        .iter()
        .map(|a| a.replace(FILE_PLACEHOLDER, &path))
        .collect();

    let mut child = match Command::new(&spec.program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(_) => return ToolOutcome::Unavailable,
    };

    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = match wait_with_deadline(&mut child, timeout) {
        Some(status) => status,
        None => {
            drain_reader(stdout_reader);
            drain_reader(stderr_reader);
            return ToolOutcome::TimedOut;
        }
    };

    let stdout = drain_reader(stdout_reader);
    let stderr = drain_reader(stderr_reader);

    if status.success() {
        // Tools in this mode rewrite the file in place.
        match std::fs::read_to_string(file.path()) {
            Ok(contents) => ToolOutcome::Success(contents),
            Err(_) => ToolOutcome::Rejected {
                diagnostic: "formatted file could not be read back".to_string(),
            },
        }
    } else {
        failed_outcome(status, &stderr, &stdout)
    }
}

/// Map a non-zero exit to its outcome. A launcher (`sh`, `npx`) that could
/// not find the tool it was asked to run exits non-zero itself, so the
/// spawn succeeded but the stage still has no usable formatter; that is
/// `Unavailable`, not a rejection of the input.
fn failed_outcome(status: ExitStatus, stderr: &str, stdout: &str) -> ToolOutcome {
    let diagnostic = pick_diagnostic(stderr, stdout);
    if launcher_reports_missing_tool(status, &diagnostic) {
        ToolOutcome::Unavailable
    } else {
        ToolOutcome::Rejected { diagnostic }
    }
}

/// Exit 127 is the shell convention for "command not found"; npx reports
/// a missing package in prose with a zero-information exit code.
fn launcher_reports_missing_tool(status: ExitStatus, diagnostic: &str) -> bool {
    if status.code() == Some(127) {
        return true;
    }
    let lower = diagnostic.to_ascii_lowercase();
    lower.contains("command not found")
        || lower.contains("could not determine executable")
        || lower.contains("canceled due to missing packages")
}

/// Poll the child until it exits or the deadline passes.
///
/// Returns the exit status, or `None` after killing a child that overran
/// its budget.
fn wait_with_deadline(child: &mut std::process::Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                thread::sleep(WAIT_POLL_INTERVAL);
            }
            Err(_) => {
                let _ = child.kill();
                return child.wait().ok();
            }
        }
    }
}

/// Collect a child output pipe on its own thread to avoid pipe-buffer
/// deadlock for large outputs.
fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<thread::JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    })
}

fn drain_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn pick_diagnostic(stderr: &str, stdout: &str) -> String {
    let diagnostic = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    if diagnostic.is_empty() {
        "tool reported failure without a diagnostic".to_string()
    } else {
        diagnostic.to_string()
    }
}
