//! The startup sequence: resolve → (bootstrap → resolve) → install → launch.
//!
//! Each phase runs to completion before the next starts. Phases that cannot
//! make progress end in [`Outcome::Idle`]; only install and exec failures are
//! returned as errors.

use std::path::PathBuf;

use serde::Serialize;

use crate::bootstrap::{self, BootstrapOutcome, ScaffoldStrategy};
use crate::config::LaunchConfig;
use crate::descriptor::{DESCRIPTOR_FILE, DEV_SCRIPT, START_SCRIPT, has_descriptor};
use crate::entry::{self, LaunchCommand};
use crate::error::Result;
use crate::installer::{self, InstallMarker, InstallPlan};
use crate::process::{CommandRunner, Invocation, ProcessReplacer};
use crate::resolver::{self, ProjectRoot, ResolvedBy};

/// Why the launcher parked itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IdleReason {
    /// No project and scaffolding is switched off.
    AutoInitDisabled,
    /// Every scaffold strategy failed.
    BootstrapExhausted { manual: String },
    /// The project declares neither entry script.
    NoEntryScript { project: PathBuf },
}

/// How a startup run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The application took over. With a real [`ProcessReplacer`] this is
    /// never observed, since the process image is gone.
    Launched(LaunchCommand),
    Idle(IdleReason),
}

/// Drives one container start.
pub struct Startup<'a> {
    config: &'a LaunchConfig,
    runner: &'a dyn CommandRunner,
    replacer: &'a dyn ProcessReplacer,
    strategies: Vec<ScaffoldStrategy>,
}

impl<'a> Startup<'a> {
    pub fn new(
        config: &'a LaunchConfig,
        runner: &'a dyn CommandRunner,
        replacer: &'a dyn ProcessReplacer,
    ) -> Self {
        Self {
            config,
            runner,
            replacer,
            strategies: bootstrap::default_strategies(config),
        }
    }

    /// Replace the scaffold strategy chain.
    pub fn with_strategies(mut self, strategies: Vec<ScaffoldStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub async fn run(&self) -> Result<Outcome> {
        let config = self.config;
        tracing::info!(
            "resolving project under {} (package manager: {})",
            config.root.display(),
            config.package_manager
        );

        let project = match locate(config) {
            Some(project) => project,
            None if !config.auto_init => {
                tracing::warn!(
                    "no project found and auto-init is disabled; waiting for a project to be mounted"
                );
                return Ok(Outcome::Idle(IdleReason::AutoInitDisabled));
            }
            None => {
                tracing::info!("no project found; scaffolding a new one in {}", config.root.display());
                match bootstrap::initialize(&config.root, config, &self.strategies, self.runner).await
                {
                    BootstrapOutcome::Exhausted { manual, .. } => {
                        tracing::warn!("entering wait state until the project is created manually");
                        return Ok(Outcome::Idle(IdleReason::BootstrapExhausted { manual }));
                    }
                    BootstrapOutcome::Created { .. } => {
                        tracing::info!("re-resolving project after scaffolding");
                        locate(config).unwrap_or_else(|| {
                            ProjectRoot::new(&config.root, ResolvedBy::RootFallback)
                        })
                    }
                }
            }
        };

        tracing::info!("project root: {}", project.path.display());
        installer::ensure_dependencies(&project.path, config.package_manager, self.runner).await?;

        let descriptor = project.descriptor();
        let Some(launch) = entry::launch_command(&project.path, &descriptor, config.package_manager)
        else {
            tracing::warn!(
                "{} declares neither a \"{DEV_SCRIPT}\" nor a \"{START_SCRIPT}\" script; \
                 add one and restart the container",
                project.path.join(DESCRIPTOR_FILE).display()
            );
            return Ok(Outcome::Idle(IdleReason::NoEntryScript {
                project: project.path,
            }));
        };

        tracing::info!("launching \"{}\" script: {}", launch.script, launch.invocation);
        if let Err(err) = self.replacer.replace(&launch.invocation) {
            tracing::error!("cannot hand off to the \"{}\" script: {err}", launch.script);
            return Err(err);
        }
        Ok(Outcome::Launched(launch))
    }
}

/// Resolve the project, accepting a root descriptor without entry scripts
/// when nothing else matches. Scaffolding over an existing descriptor would
/// clobber a real project.
pub fn locate(config: &LaunchConfig) -> Option<ProjectRoot> {
    let override_dir = config.override_dir();
    if let Some(project) = resolver::resolve(&config.root, override_dir.as_deref()) {
        return Some(project);
    }
    if has_descriptor(&config.root) {
        tracing::info!(
            "root {} has a descriptor without entry scripts; using it as the project",
            config.root.display()
        );
        return Some(ProjectRoot::new(&config.root, ResolvedBy::RootFallback));
    }
    None
}

/// What a startup run would do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupPlan {
    pub root: PathBuf,
    pub project: Option<ProjectRoot>,
    /// Scaffold attempts that would be tried, in order.
    pub scaffold: Vec<Invocation>,
    pub install_plan: Option<InstallPlan>,
    pub install: Option<Invocation>,
    pub launch: Option<LaunchCommand>,
    pub idle: Option<IdleReason>,
}

/// Compute the [`StartupPlan`] for `config`.
///
/// Nothing is spawned or written. When scaffolding would be needed the plan
/// stops there, since what follows depends on what the tool creates.
pub fn plan(config: &LaunchConfig) -> StartupPlan {
    let mut plan = StartupPlan {
        root: config.root.clone(),
        project: None,
        scaffold: Vec::new(),
        install_plan: None,
        install: None,
        launch: None,
        idle: None,
    };

    let Some(project) = locate(config) else {
        if config.auto_init {
            plan.scaffold = bootstrap::default_strategies(config)
                .iter()
                .filter_map(|strategy| strategy.invocation(config, &config.root))
                .collect();
        } else {
            plan.idle = Some(IdleReason::AutoInitDisabled);
        }
        return plan;
    };

    let install_plan = InstallMarker::inspect(&project.path, config.package_manager).plan();
    plan.install_plan = Some(install_plan);
    plan.install = install_plan.invocation(&project.path, config.package_manager);
    plan.launch = entry::launch_command(&project.path, &project.descriptor(), config.package_manager);
    if plan.launch.is_none() {
        plan.idle = Some(IdleReason::NoEntryScript {
            project: project.path.clone(),
        });
    }
    plan.project = Some(project);
    plan
}
