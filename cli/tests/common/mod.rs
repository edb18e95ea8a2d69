//! Shared harness for driving the `launchpad` binary against fake tools.
//!
//! `npm` and `npx` are replaced by shell scripts on `PATH` that append their
//! argv to a log file and mimic the side effects the launcher checks for.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use assert_cmd::cargo::CommandCargoExt;
use tempfile::TempDir;

pub const DEV_PROJECT: &str = r#"{"name":"video","scripts":{"dev":"remotion studio"}}"#;

const FAKE_NPM: &str = r#"#!/bin/sh
echo "npm $*" >> "$LAUNCHPAD_TEST_LOG"
case "$1" in
  install|ci)
    if [ -n "$FAKE_INSTALL_EXIT" ]; then exit "$FAKE_INSTALL_EXIT"; fi
    mkdir -p node_modules
    ;;
  run)
    echo "fake app running $2"
    ;;
esac
"#;

const FAKE_NPX: &str = r#"#!/bin/sh
echo "npx $*" >> "$LAUNCHPAD_TEST_LOG"
if [ -n "$FAKE_SCAFFOLD_FAIL" ]; then exit 1; fi
case " $* " in
  *" --template "*)
    printf '%s' '{"name":"video","scripts":{"dev":"remotion studio"}}' > package.json
    ;;
  *)
    exit 1
    ;;
esac
"#;

pub struct Harness {
    pub root: TempDir,
    tools: TempDir,
}

impl Harness {
    pub fn new() -> Result<Self> {
        let harness = Self {
            root: TempDir::new()?,
            tools: TempDir::new()?,
        };
        harness.install_tool("npm", FAKE_NPM)?;
        harness.install_tool("npx", FAKE_NPX)?;
        Ok(harness)
    }

    fn install_tool(&self, name: &str, script: &str) -> Result<()> {
        let path = self.tools.path().join(name);
        fs::write(&path, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.tools.path().join("calls.log")
    }

    /// Tool invocations in call order; empty when nothing ran.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn write_project(&self, dir: &str, descriptor: &str) -> Result<PathBuf> {
        let project = self.root().join(dir);
        fs::create_dir_all(&project)?;
        fs::write(project.join("package.json"), descriptor)?;
        Ok(project)
    }

    pub fn tools_dir(&self) -> &Path {
        self.tools.path()
    }

    pub fn remove_tool(&self, name: &str) -> Result<()> {
        fs::remove_file(self.tools.path().join(name))?;
        Ok(())
    }

    /// `launchpad` with a clean `LAUNCHPAD_*` environment, the fake tools
    /// first on `PATH` and the root pointed at this harness.
    pub fn std_command(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("launchpad")?;
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with("LAUNCHPAD_") {
                cmd.env_remove(&key);
            }
        }
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut dirs = vec![self.tools.path().to_path_buf()];
        dirs.extend(std::env::split_paths(&path));
        cmd.env("PATH", std::env::join_paths(dirs)?)
            .env("LAUNCHPAD_ROOT", self.root())
            .env("LAUNCHPAD_TEST_LOG", self.log_path())
            .env_remove("RUST_LOG")
            .env_remove("FAKE_INSTALL_EXIT")
            .env_remove("FAKE_SCAFFOLD_FAIL");
        Ok(cmd)
    }

    pub fn command(&self) -> Result<assert_cmd::Command> {
        Ok(assert_cmd::Command::from_std(self.std_command()?))
    }
}
