//! Error types for the launcher.
//!
//! Only two classes of failure abort startup: a failed dependency install and
//! a failed process replacement. Everything else (missing project, exhausted
//! scaffold strategies, no entry script) is a state transition, not an error.

use thiserror::Error;

use crate::process::CommandStatus;

/// Launcher result type alias
pub type Result<T> = std::result::Result<T, LaunchError>;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {}` exited with {status}", .args.join(" "))]
    Install {
        program: String,
        args: Vec<String>,
        status: CommandStatus,
    },

    #[error("failed to exec `{program}`: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for {var}: '{value}' (expected: {expected})")]
    InvalidEnvValue {
        var: String,
        value: String,
        expected: String,
    },

    #[error("{var} resolves to an empty command")]
    EmptyCommand { var: String },

    #[error("{var} is not a valid shell-quoted command: '{value}'")]
    InvalidCommand { var: String, value: String },
}
