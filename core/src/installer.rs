//! Idempotent dependency installation.
//!
//! | `node_modules` | lockfile | action |
//! |---|---|---|
//! | yes | yes | skip |
//! | no  | yes | reproducible install |
//! | no  | no  | flexible install |
//! | yes | no  | skip |
//!
//! A present dependency directory always wins, so restarts of a long-lived
//! container never reinstall. Install failures are fatal.

use std::path::Path;

use serde::Serialize;

use crate::config::PackageManager;
use crate::error::{LaunchError, Result};
use crate::process::{CommandRunner, Invocation};

/// Directory holding installed dependencies.
pub const DEPENDENCY_DIR: &str = "node_modules";

/// What the installer will do for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallPlan {
    Skip,
    /// Install exactly what the lockfile pins.
    Reproducible,
    /// Resolve the newest versions the descriptor allows.
    Flexible,
}

/// Presence of the install markers in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstallMarker {
    pub dependency_dir: bool,
    pub lockfile: bool,
}

impl InstallMarker {
    pub fn inspect(project: &Path, package_manager: PackageManager) -> Self {
        Self {
            dependency_dir: project.join(DEPENDENCY_DIR).is_dir(),
            lockfile: package_manager
                .lockfiles()
                .iter()
                .any(|name| project.join(name).is_file()),
        }
    }

    pub fn plan(self) -> InstallPlan {
        match (self.dependency_dir, self.lockfile) {
            (true, _) => InstallPlan::Skip,
            (false, true) => InstallPlan::Reproducible,
            (false, false) => InstallPlan::Flexible,
        }
    }
}

impl InstallPlan {
    pub fn invocation(self, project: &Path, package_manager: PackageManager) -> Option<Invocation> {
        let args = match self {
            Self::Skip => return None,
            Self::Reproducible => package_manager.reproducible_install_args(),
            Self::Flexible => package_manager.flexible_install_args(),
        };
        Some(Invocation::new(package_manager.as_str(), project).args(args.iter().copied()))
    }
}

/// Make sure `project` has its dependencies installed.
pub async fn ensure_dependencies(
    project: &Path,
    package_manager: PackageManager,
    runner: &dyn CommandRunner,
) -> Result<InstallPlan> {
    let marker = InstallMarker::inspect(project, package_manager);
    let plan = marker.plan();

    let Some(invocation) = plan.invocation(project, package_manager) else {
        if marker.lockfile {
            tracing::info!("dependencies already installed; skipping install");
        } else {
            tracing::info!(
                "{DEPENDENCY_DIR} present without {}; skipping install",
                package_manager.lockfiles().join(" or ")
            );
        }
        return Ok(plan);
    };

    tracing::info!("installing dependencies ({plan:?}): {invocation}");
    let status = runner.run(&invocation).await?;
    if !status.success() {
        tracing::error!("dependency install failed with {status}");
        return Err(LaunchError::Install {
            program: invocation.program,
            args: invocation.args,
            status,
        });
    }
    tracing::info!("dependencies installed");
    Ok(plan)
}
