//! Project scaffolding through an external tool.
//!
//! Scaffolding tools change their flag names and prompting behavior between
//! releases, so the initializer walks an ordered list of strategies, from
//! the most explicit invocation to the most permissive one. Each strategy
//! carries its own success predicate; the tool's exit code is logged but
//! never decides the outcome, because the filesystem is authoritative.

use std::path::Path;

use serde::Serialize;

use crate::config::LaunchConfig;
use crate::descriptor::has_descriptor;
use crate::process::{CommandRunner, Invocation};

/// Directory argument passed to the scaffolding tool; it always runs inside
/// the root.
const TARGET_DIR: &str = ".";

/// One way of invoking the scaffolding tool.
#[derive(Debug, Clone)]
pub struct ScaffoldStrategy {
    pub name: &'static str,
    /// Arguments appended after the configured scaffold command.
    pub args: Vec<String>,
    /// Input fed to an interactive tool.
    pub stdin: Option<String>,
    /// Decides whether the attempt produced a project in the root.
    pub verify: fn(&Path) -> bool,
}

impl ScaffoldStrategy {
    pub fn invocation(&self, config: &LaunchConfig, root: &Path) -> Option<Invocation> {
        let (program, base_args) = config.scaffold_command.split_first()?;
        let mut invocation = Invocation::new(program.as_str(), root)
            .args(base_args.iter().cloned())
            .args(self.args.iter().cloned());
        if let Some(input) = &self.stdin {
            invocation = invocation.stdin(input.as_str());
        }
        Some(invocation)
    }
}

/// The strategy chain, in the order it is tried.
pub fn default_strategies(config: &LaunchConfig) -> Vec<ScaffoldStrategy> {
    let template = config.template.as_str();
    let language = config.language.as_str();
    let package_manager = config.package_manager.as_str();

    vec![
        ScaffoldStrategy {
            name: "long-flags",
            args: [
                "--template",
                template,
                "--language",
                language,
                "--package-manager",
                package_manager,
                "--yes",
                TARGET_DIR,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            stdin: None,
            verify: has_descriptor,
        },
        ScaffoldStrategy {
            name: "short-flags",
            args: [
                "-t",
                template,
                "-l",
                language,
                "-p",
                package_manager,
                "-y",
                TARGET_DIR,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            stdin: None,
            verify: has_descriptor,
        },
        ScaffoldStrategy {
            name: "interactive-default",
            args: vec![TARGET_DIR.to_string()],
            stdin: Some("\n".to_string()),
            verify: has_descriptor,
        },
    ]
}

/// Result of running the strategy chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    Created { strategy: &'static str, attempts: usize },
    /// Every strategy ran and none produced a descriptor. `manual` is the
    /// command an operator can run by hand.
    Exhausted { attempts: usize, manual: String },
}

/// Try each strategy in order until one leaves a project in `root`.
///
/// Never fails: a tool that cannot even be spawned counts as a failed
/// attempt, and exhaustion is reported through [`BootstrapOutcome`].
pub async fn initialize(
    root: &Path,
    config: &LaunchConfig,
    strategies: &[ScaffoldStrategy],
    runner: &dyn CommandRunner,
) -> BootstrapOutcome {
    if let Err(err) = std::fs::create_dir_all(root) {
        tracing::warn!("cannot create root {}: {err}", root.display());
    }

    let mut attempts = 0;
    for strategy in strategies {
        let Some(invocation) = strategy.invocation(config, root) else {
            break;
        };
        attempts += 1;
        tracing::info!(
            "scaffold attempt {attempts}/{} ({}): {invocation}",
            strategies.len(),
            strategy.name
        );

        match runner.run(&invocation).await {
            Ok(status) if !status.success() => {
                tracing::warn!("scaffold tool exited with {status}; checking for a project anyway");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("scaffold attempt {} failed: {err}", strategy.name),
        }

        if (strategy.verify)(root) {
            tracing::info!("scaffold attempt {} created a project", strategy.name);
            return BootstrapOutcome::Created {
                strategy: strategy.name,
                attempts,
            };
        }
        tracing::warn!(
            "scaffold attempt {} left no project in {}",
            strategy.name,
            root.display()
        );
    }

    let manual = strategies
        .first()
        .and_then(|strategy| strategy.invocation(config, root))
        .map(|invocation| format!("cd {} && {invocation}", root.display()))
        .unwrap_or_default();
    tracing::error!("all {attempts} scaffold attempts failed; create the project manually: {manual}");
    BootstrapOutcome::Exhausted { attempts, manual }
}
