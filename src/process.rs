//! External tool driver.
//!
//! Runs out-of-process tools (ffmpeg, ffprobe, whisper.cpp) with both output
//! streams drained concurrently, a hard deadline, and an explicit check that
//! the tool actually produced the artifact it was asked for. A zero exit code
//! alone is not trusted: some tools exit cleanly while writing nothing.

use crate::defaults::STDERR_EXCERPT_LEN;
use crate::error::{Result, SubgenError};
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Callback invoked for each line a tool writes to a captured stream.
/// Used for best-effort progress hints; never required for correctness.
pub type LineHook = Box<dyn Fn(&str) + Send + Sync>;

/// One external tool invocation.
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    expected_output: Option<PathBuf>,
    timeout: Duration,
    stdout_hook: Option<LineHook>,
    stderr_hook: Option<LineHook>,
}

/// Captured output of a finished invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            expected_output: None,
            timeout,
            stdout_hook: None,
            stderr_hook: None,
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

    /// Path the tool is expected to create. Checked after a zero exit;
    /// a missing file fails the invocation even when the tool reported
    /// success.
    pub fn expect_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_output = Some(path.into());
        self
    }

    /// Observe stdout lines as they arrive.
    pub fn on_stdout_line(mut self, hook: LineHook) -> Self {
        self.stdout_hook = Some(hook);
        self
    }

    /// Observe stderr lines as they arrive.
    pub fn on_stderr_line(mut self, hook: LineHook) -> Self {
        self.stderr_hook = Some(hook);
        self
    }

    /// Short name for error messages (program without its directory).
    fn tool_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.clone())
    }

    /// Run the tool to completion.
    ///
    /// Both streams are read concurrently to avoid pipe-buffer deadlock on
    /// chatty tools. Fails when the exit code is non-zero, when the deadline
    /// expires (the child is killed), or when the expected output artifact is
    /// missing after an otherwise clean exit.
    pub async fn run(self) -> Result<ToolOutput> {
        let tool = self.tool_name();
        debug!("running {} {}", self.program, self.args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SubgenError::ExternalTool {
                tool: tool.clone(),
                exit_code: None,
                stderr_excerpt: format!("failed to spawn: {}", e),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SubgenError::Other(format!("{tool}: stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SubgenError::Other(format!("{tool}: stderr not captured")))?;

        let stdout_task = tokio::spawn(drain_lines(stdout, self.stdout_hook));
        let stderr_task = tokio::spawn(drain_lines(stderr, self.stderr_hook));

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                // Deadline expired: kill the child, then fail the stage.
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(SubgenError::ExternalToolTimeout {
                    tool,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout_text = stdout_task.await.unwrap_or_default();
        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(SubgenError::ExternalTool {
                tool,
                exit_code: status.code(),
                stderr_excerpt: excerpt(&stderr_text),
            });
        }

        if let Some(expected) = &self.expected_output
            && !expected.exists()
        {
            return Err(SubgenError::ExternalTool {
                tool,
                exit_code: status.code(),
                stderr_excerpt: format!(
                    "exited successfully but did not produce {}: {}",
                    expected.display(),
                    excerpt(&stderr_text)
                ),
            });
        }

        Ok(ToolOutput {
            stdout: stdout_text,
            stderr: stderr_text,
        })
    }
}

/// Read a stream line by line, feeding the hook, and return the full text.
async fn drain_lines<R: AsyncRead + Unpin>(reader: R, hook: Option<LineHook>) -> String {
    let mut lines = BufReader::new(reader).lines();
    let mut collected = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(hook) = &hook {
            hook(&line);
        }
        collected.push_str(&line);
        collected.push('\n');
    }
    collected
}

/// Keep only the tail of a stderr capture for error messages.
fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_EXCERPT_LEN {
        return trimmed.to_string();
    }
    let start = trimmed.len() - STDERR_EXCERPT_LEN;
    // Avoid slicing mid-codepoint
    let start = (start..trimmed.len())
        .find(|i| trimmed.is_char_boundary(*i))
        .unwrap_or(start);
    format!("...{}", &trimmed[start..])
}
