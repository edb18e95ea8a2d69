//! External process plumbing.
//!
//! Two seams, both traits so the startup sequence can be driven by test
//! doubles:
//! - [`CommandRunner`] runs a tool to completion (scaffolding, installs)
//! - [`ProcessReplacer`] hands the process over to the application for good

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{LaunchError, Result};

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Bytes written to the child's stdin before it is closed. Without it
    /// stdin is `/dev/null`, so a prompting tool sees EOF instead of hanging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            stdin: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Shell-quoted command line, for logs and recovery hints.
    pub fn command_line(&self) -> String {
        let words =
            std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(words).unwrap_or_else(|_| {
            std::iter::once(self.program.clone())
                .chain(self.args.iter().cloned())
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Exit status of a finished command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn failed(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("no exit code (terminated by signal)"),
        }
    }
}

/// Runs an external command to completion.
///
/// Output is not captured: the child shares the launcher's stdout/stderr so
/// tool progress lands in the container log.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `invocation` and wait for it. `Err` means the command could not be
    /// started at all; a non-zero exit is reported through the status.
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        let spawn_error = |source: std::io::Error| LaunchError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        if let Some(input) = &invocation.stdin
            && let Some(mut stdin) = child.stdin.take()
        {
            // A tool that exits without reading its input closes the pipe
            // first; that is its business, not a launcher failure.
            if let Err(err) = stdin.write_all(input.as_bytes()).await {
                tracing::debug!("stdin for `{}` not fully written: {err}", invocation.program);
            }
            drop(stdin);
        }

        let status = child.wait().await.map_err(spawn_error)?;
        Ok(CommandStatus {
            code: status.code(),
        })
    }
}

/// Replaces the current process with the application.
pub trait ProcessReplacer: Send + Sync {
    /// On success this never returns (for the real implementation); an `Err`
    /// means the handoff itself failed.
    fn replace(&self, invocation: &Invocation) -> Result<()>;
}

/// [`ProcessReplacer`] using `execvp` on Unix.
///
/// Elsewhere the application runs as a child and its exit code becomes the
/// launcher's, so the orchestrator still observes the application's fate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecReplacer;

impl ProcessReplacer for ExecReplacer {
    fn replace(&self, invocation: &Invocation) -> Result<()> {
        let mut command = std::process::Command::new(&invocation.program);
        command.args(&invocation.args).current_dir(&invocation.cwd);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // exec() only returns on error
            let source = command.exec();
            Err(LaunchError::Exec {
                program: invocation.program.clone(),
                source,
            })
        }

        #[cfg(not(unix))]
        {
            let status = command.status().map_err(|source| LaunchError::Exec {
                program: invocation.program.clone(),
                source,
            })?;
            std::process::exit(status.code().unwrap_or(1));
        }
    }
}
