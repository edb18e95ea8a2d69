//! Entry script selection.

use std::path::Path;

use serde::Serialize;

use crate::config::PackageManager;
use crate::descriptor::{DEV_SCRIPT, ProjectDescriptor, START_SCRIPT};
use crate::process::Invocation;

/// Scripts eligible for launching, most preferred first.
pub const ENTRY_SCRIPTS: [&str; 2] = [DEV_SCRIPT, START_SCRIPT];

/// The command that will replace the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub script: &'static str,
    pub invocation: Invocation,
}

pub fn select_script(descriptor: &ProjectDescriptor) -> Option<&'static str> {
    ENTRY_SCRIPTS
        .into_iter()
        .find(|script| descriptor.has_script(script))
}

/// Build the launch command for `project`, or `None` when it declares no
/// entry script.
pub fn launch_command(
    project: &Path,
    descriptor: &ProjectDescriptor,
    package_manager: PackageManager,
) -> Option<LaunchCommand> {
    let script = select_script(descriptor)?;
    Some(LaunchCommand {
        script,
        invocation: Invocation::new(package_manager.as_str(), project).args(["run", script]),
    })
}
