//! Launcher configuration.
//!
//! Environment reading is a single IO boundary ([`LaunchConfig::from_env`])
//! wrapped around a pure resolver ([`LaunchConfig::from_lookup`]) so every
//! default and parse rule is unit testable without touching the process
//! environment. Command-line flags are layered on top by the binary.
//!
//! ## Environment Variables
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LAUNCHPAD_ROOT` | `/app` |
//! | `LAUNCHPAD_PROJECT_DIR` | (unset) |
//! | `LAUNCHPAD_AUTO_INIT` | `true` |
//! | `LAUNCHPAD_TEMPLATE` | `blank` |
//! | `LAUNCHPAD_LANGUAGE` | `ts` |
//! | `LAUNCHPAD_PACKAGE_MANAGER` | `npm` |
//! | `LAUNCHPAD_SCAFFOLD_COMMAND` | `npx --yes create-video@latest` |
//! | `LAUNCHPAD_EXIT_ON_IDLE` | `false` |

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{LaunchError, Result};

pub const ENV_ROOT: &str = "LAUNCHPAD_ROOT";
pub const ENV_PROJECT_DIR: &str = "LAUNCHPAD_PROJECT_DIR";
pub const ENV_AUTO_INIT: &str = "LAUNCHPAD_AUTO_INIT";
pub const ENV_TEMPLATE: &str = "LAUNCHPAD_TEMPLATE";
pub const ENV_LANGUAGE: &str = "LAUNCHPAD_LANGUAGE";
pub const ENV_PACKAGE_MANAGER: &str = "LAUNCHPAD_PACKAGE_MANAGER";
pub const ENV_SCAFFOLD_COMMAND: &str = "LAUNCHPAD_SCAFFOLD_COMMAND";
pub const ENV_EXIT_ON_IDLE: &str = "LAUNCHPAD_EXIT_ON_IDLE";

pub const DEFAULT_ROOT: &str = "/app";
pub const DEFAULT_TEMPLATE: &str = "blank";
pub const DEFAULT_LANGUAGE: &str = "ts";
pub const DEFAULT_SCAFFOLD_COMMAND: &str = "npx --yes create-video@latest";

/// Package manager used for scaffolding, installing and launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    /// Lockfiles this package manager writes next to the descriptor, current
    /// format first. Bun switched from `bun.lockb` to the text `bun.lock` in 1.2.
    pub fn lockfiles(self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["package-lock.json"],
            Self::Yarn => &["yarn.lock"],
            Self::Pnpm => &["pnpm-lock.yaml"],
            Self::Bun => &["bun.lock", "bun.lockb"],
        }
    }

    /// Arguments for an install that must match the lockfile exactly.
    pub fn reproducible_install_args(self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["ci"],
            Self::Yarn | Self::Pnpm | Self::Bun => &["install", "--frozen-lockfile"],
        }
    }

    /// Arguments for an install free to resolve newer compatible versions.
    pub fn flexible_install_args(self) -> &'static [&'static str] {
        &["install"]
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            "bun" => Ok(Self::Bun),
            other => Err(format!("unknown package manager '{other}'")),
        }
    }
}

/// Fully resolved launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Root search path; every project lives at or directly under it.
    pub root: PathBuf,
    /// Explicit project directory, relative to `root`.
    pub project_dir: Option<PathBuf>,
    /// Scaffold a project when none can be resolved.
    pub auto_init: bool,
    pub template: String,
    pub language: String,
    pub package_manager: PackageManager,
    /// Scaffolding tool as program + leading arguments.
    pub scaffold_command: Vec<String>,
    /// Return from the idle state instead of blocking until terminated.
    pub exit_on_idle: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            project_dir: None,
            auto_init: true,
            template: DEFAULT_TEMPLATE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            package_manager: PackageManager::default(),
            scaffold_command: DEFAULT_SCAFFOLD_COMMAND
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            exit_on_idle: false,
        }
    }
}

impl LaunchConfig {
    /// Load configuration from the process environment.
    ///
    /// This is the single IO boundary for configuration; call once at startup.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Unset and empty values both fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(root) = get(ENV_ROOT) {
            config.root = PathBuf::from(root);
        }
        if let Some(value) = get(ENV_PROJECT_DIR) {
            config.project_dir = Some(parse_project_dir(ENV_PROJECT_DIR, &value)?);
        }
        if let Some(value) = get(ENV_AUTO_INIT) {
            config.auto_init = parse_bool(ENV_AUTO_INIT, &value)?;
        }
        if let Some(template) = get(ENV_TEMPLATE) {
            config.template = template.trim().to_string();
        }
        if let Some(language) = get(ENV_LANGUAGE) {
            config.language = language.trim().to_string();
        }
        if let Some(value) = get(ENV_PACKAGE_MANAGER) {
            config.package_manager =
                value
                    .parse()
                    .map_err(|_: String| LaunchError::InvalidEnvValue {
                        var: ENV_PACKAGE_MANAGER.to_string(),
                        value: value.clone(),
                        expected: "npm, yarn, pnpm or bun".to_string(),
                    })?;
        }
        if let Some(value) = get(ENV_SCAFFOLD_COMMAND) {
            config.scaffold_command = parse_command(ENV_SCAFFOLD_COMMAND, &value)?;
        }
        if let Some(value) = get(ENV_EXIT_ON_IDLE) {
            config.exit_on_idle = parse_bool(ENV_EXIT_ON_IDLE, &value)?;
        }

        Ok(config)
    }

    /// Directory named by the override, if one is configured. An override
    /// that would leave the root is ignored.
    pub fn override_dir(&self) -> Option<PathBuf> {
        self.project_dir
            .as_deref()
            .filter(|dir| is_subpath(dir))
            .map(|dir| self.root.join(dir))
    }
}

/// Parse a project directory override: a relative path that stays inside the
/// root. Absolute paths and `..` components are rejected.
pub fn parse_project_dir(var: &str, value: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(value.trim());
    if !is_subpath(&dir) {
        return Err(LaunchError::InvalidEnvValue {
            var: var.to_string(),
            value: value.to_string(),
            expected: "a relative path below the root".to_string(),
        });
    }
    Ok(dir)
}

fn is_subpath(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Parse a boolean toggle; unrecognized values are rejected rather than
/// silently treated as `false`.
pub fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(LaunchError::InvalidEnvValue {
            var: var.to_string(),
            value: value.to_string(),
            expected: "true/false, 1/0, yes/no or on/off".to_string(),
        }),
    }
}

/// Split a shell-quoted command line into program and arguments.
pub fn parse_command(var: &str, value: &str) -> Result<Vec<String>> {
    let words = shlex::split(value).ok_or_else(|| LaunchError::InvalidCommand {
        var: var.to_string(),
        value: value.to_string(),
    })?;
    if words.is_empty() {
        return Err(LaunchError::EmptyCommand {
            var: var.to_string(),
        });
    }
    Ok(words)
}
