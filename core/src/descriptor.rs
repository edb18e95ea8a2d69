//! Project descriptor (`package.json`) inspection.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// File whose presence marks a directory as a project.
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Script preferred for launching.
pub const DEV_SCRIPT: &str = "dev";

/// Fallback launch script.
pub const START_SCRIPT: &str = "start";

/// The parts of `package.json` the launcher reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl ProjectDescriptor {
    /// Read the descriptor in `dir`.
    ///
    /// Returns `None` when the file is absent. A file that exists but cannot
    /// be read or parsed yields an empty descriptor: the directory still
    /// counts as a project, it just declares no scripts.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            return None;
        }
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("cannot read {}: {err}", path.display());
                return Some(Self::default());
            }
        };
        // npm tolerates a leading byte-order mark; serde_json does not.
        let json = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
        match serde_json::from_str(json) {
            Ok(descriptor) => Some(descriptor),
            Err(err) => {
                tracing::warn!("{} is not a valid descriptor: {err}", path.display());
                Some(Self::default())
            }
        }
    }

    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Whether either launchable script is declared.
    pub fn is_launchable(&self) -> bool {
        self.has_script(DEV_SCRIPT) || self.has_script(START_SCRIPT)
    }
}

/// Whether `dir` holds a descriptor file.
pub fn has_descriptor(dir: &Path) -> bool {
    dir.join(DESCRIPTOR_FILE).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_descriptor_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(ProjectDescriptor::load(dir.path()).is_none());
        assert!(!has_descriptor(dir.path()));
    }

    #[test]
    fn scripts_are_read() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DESCRIPTOR_FILE),
            r#"{"name":"video","scripts":{"dev":"remotion studio","build":"remotion bundle"}}"#,
        )
        .unwrap();

        let descriptor = ProjectDescriptor::load(dir.path()).unwrap();
        assert_eq!(descriptor.name.as_deref(), Some("video"));
        assert!(descriptor.has_script("dev"));
        assert!(!descriptor.has_script("start"));
        assert!(descriptor.is_launchable());
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DESCRIPTOR_FILE),
            "\u{feff}{\"scripts\":{\"dev\":\"remotion studio\"}}",
        )
        .unwrap();

        let descriptor = ProjectDescriptor::load(dir.path()).unwrap();
        assert!(descriptor.has_script("dev"));
        assert!(descriptor.is_launchable());
    }

    #[test]
    fn malformed_descriptor_still_counts_as_project() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTOR_FILE), "{ not json").unwrap();

        let descriptor = ProjectDescriptor::load(dir.path()).unwrap();
        assert!(descriptor.scripts.is_empty());
        assert!(!descriptor.is_launchable());
        assert!(has_descriptor(dir.path()));
    }

    #[test]
    fn descriptor_without_scripts_is_not_launchable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTOR_FILE), r#"{"name":"lib"}"#).unwrap();
        assert!(!ProjectDescriptor::load(dir.path()).unwrap().is_launchable());
    }
}
