//! Supervised execution of external tools
//!
//! Output is read line by line from both pipes concurrently and handed to a
//! callback as it arrives. There is no timeout: a hung tool blocks the caller.
//! Both pipes are drained to EOF; a read error kills the tool.

use crate::error::{Result, SdkError};
use log::{debug, warn};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

/// Which pipe a line was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => write!(f, "stdout"),
            Stream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Hand out a buffered line without its line ending and clear the buffer.
/// Bytes that are not UTF-8 are replaced rather than rejected.
fn flush_line<F>(stream: Stream, buf: &mut Vec<u8>, on_line: &mut F)
where
    F: FnMut(Stream, &str),
{
    if buf.is_empty() {
        return;
    }
    let mut end = buf.len();
    if buf[..end].ends_with(b"\n") {
        end -= 1;
    }
    if buf[..end].ends_with(b"\r") {
        end -= 1;
    }
    on_line(stream, &String::from_utf8_lossy(&buf[..end]));
    buf.clear();
}

/// An external program invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Short name used in messages, e.g. `cmake`
    pub fn tool_name(&self) -> String {
        self.program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run the program, calling `on_line` for every line on either pipe.
    ///
    /// A program that cannot be found yields [`SdkError::ToolNotFound`].
    /// The exit status is returned as-is; callers decide what failure means.
    pub async fn run<F>(&self, mut on_line: F) -> Result<ExitStatus>
    where
        F: FnMut(Stream, &str),
    {
        debug!("Running: {}", self);

        let mut command = TokioCommand::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SdkError::ToolNotFound {
                    tool: self.tool_name(),
                    reason: format!("{} could not be found on PATH", self.program.display()),
                }
            } else {
                SdkError::build_failure(format!("Failed to start {}: {}", self, e))
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SdkError::build_failure(format!("Failed to capture stdout of {}", self)))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SdkError::build_failure(format!("Failed to capture stderr of {}", self)))?;

        let mut stdout_reader = BufReader::new(stdout);
        let mut stderr_reader = BufReader::new(stderr);
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut read_error = None;

        // Partial reads stay in the buffers when the other branch wins, so
        // a buffer is only cleared once a whole line has been handed out.
        while !(stdout_done && stderr_done) {
            tokio::select! {
                read = stdout_reader.read_until(b'\n', &mut stdout_buf), if !stdout_done => {
                    match read {
                        Ok(0) => {
                            flush_line(Stream::Stdout, &mut stdout_buf, &mut on_line);
                            stdout_done = true;
                        }
                        Ok(_) => {
                            if stdout_buf.ends_with(b"\n") {
                                flush_line(Stream::Stdout, &mut stdout_buf, &mut on_line);
                            }
                        }
                        Err(e) => {
                            warn!("Error reading stdout of {}: {}", self.tool_name(), e);
                            stdout_done = true;
                            if read_error.is_none() {
                                read_error = Some((Stream::Stdout, e));
                            }
                            let _ = child.kill().await;
                        }
                    }
                }
                read = stderr_reader.read_until(b'\n', &mut stderr_buf), if !stderr_done => {
                    match read {
                        Ok(0) => {
                            flush_line(Stream::Stderr, &mut stderr_buf, &mut on_line);
                            stderr_done = true;
                        }
                        Ok(_) => {
                            if stderr_buf.ends_with(b"\n") {
                                flush_line(Stream::Stderr, &mut stderr_buf, &mut on_line);
                            }
                        }
                        Err(e) => {
                            warn!("Error reading stderr of {}: {}", self.tool_name(), e);
                            stderr_done = true;
                            if read_error.is_none() {
                                read_error = Some((Stream::Stderr, e));
                            }
                            let _ = child.kill().await;
                        }
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| SdkError::build_failure(format!("Failed to wait for {}: {}", self, e)))?;
        debug!("{} exited with {}", self.tool_name(), status);

        if let Some((stream, e)) = read_error {
            return Err(SdkError::build_failure(format!(
                "Failed to read {} of {}: {}",
                stream, self, e
            )));
        }
        Ok(status)
    }

    /// Run and turn a non-zero exit into [`SdkError::BuildFailure`]
    pub async fn run_checked<F>(&self, phase: &str, on_line: F) -> Result<()>
    where
        F: FnMut(Stream, &str),
    {
        let status = self.run(on_line).await?;
        ensure_success(&self.tool_name(), phase, status)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

pub fn ensure_success(tool: &str, phase: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let code = status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "a signal".to_string());
    Err(SdkError::build_failure(format!(
        "{} {} failed with exit code {}",
        tool, phase, code
    )))
}
