//! Project directory resolution.
//!
//! Resolution order, first match wins:
//! 1. the configured override, when it holds a descriptor
//! 2. the root, when its descriptor declares `dev` or `start`
//! 3. the single immediate subdirectory holding a descriptor
//!
//! Zero or several subdirectory candidates leave the project unresolved;
//! ambiguity is never guessed away. Resolution only inspects the filesystem
//! and never fails: unreadable directories count as empty.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::descriptor::{ProjectDescriptor, has_descriptor};

/// How a project root was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Override,
    Root,
    Subdirectory,
    /// Root descriptor accepted although it declares no entry script.
    RootFallback,
}

/// A directory believed to contain a valid project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoot {
    pub path: PathBuf,
    pub resolved_by: ResolvedBy,
}

impl ProjectRoot {
    pub fn new(path: impl Into<PathBuf>, resolved_by: ResolvedBy) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self { path, resolved_by }
    }

    pub fn descriptor(&self) -> ProjectDescriptor {
        ProjectDescriptor::load(&self.path).unwrap_or_default()
    }
}

/// Locate the project under `root`.
///
/// `override_dir` is the already-joined `<root>/<override>` path.
pub fn resolve(root: &Path, override_dir: Option<&Path>) -> Option<ProjectRoot> {
    if let Some(dir) = override_dir {
        if has_descriptor(dir) {
            tracing::info!("using configured project directory {}", dir.display());
            return Some(ProjectRoot::new(dir, ResolvedBy::Override));
        }
        tracing::warn!(
            "configured project directory {} has no descriptor; ignoring override",
            dir.display()
        );
    }

    if ProjectDescriptor::load(root).is_some_and(|d| d.is_launchable()) {
        tracing::info!("using project at root {}", root.display());
        return Some(ProjectRoot::new(root, ResolvedBy::Root));
    }

    let candidates = candidate_subdirectories(root);
    match candidates.as_slice() {
        [only] => {
            tracing::info!("using project in subdirectory {}", only.display());
            Some(ProjectRoot::new(only, ResolvedBy::Subdirectory))
        }
        [] => {
            tracing::info!("no project found under {}", root.display());
            None
        }
        many => {
            tracing::warn!(
                "{} projects found under {}; set the project directory override to choose one",
                many.len(),
                root.display()
            );
            for candidate in many {
                tracing::debug!("candidate: {}", candidate.display());
            }
            None
        }
    }
}

/// Immediate, non-hidden subdirectories of `root` that hold a descriptor,
/// in name order.
pub fn candidate_subdirectories(root: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!("cannot list {}: {err}", root.display());
            return Vec::new();
        }
    };

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && has_descriptor(path))
        .collect();
    candidates.sort();
    candidates
}
