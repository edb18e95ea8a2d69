#![cfg(unix)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use std::fs;
use std::process::{Child, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::Result;
use common::{DEV_PROJECT, Harness};
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use serial_test::serial;

#[test]
#[serial]
fn execs_dev_script_of_installed_project() -> Result<()> {
    let harness = Harness::new()?;
    harness.write_project(".", DEV_PROJECT)?;
    fs::create_dir(harness.root().join("node_modules"))?;

    harness
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("fake app running dev"));

    assert_eq!(harness.calls(), vec!["npm run dev"]);
    Ok(())
}

#[test]
#[serial]
fn installs_from_lockfile_before_launching() -> Result<()> {
    let harness = Harness::new()?;
    let project = harness.write_project("video", r#"{"scripts":{"start":"node ."}}"#)?;
    fs::write(project.join("package-lock.json"), "{}")?;

    harness
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("fake app running start"));

    assert_eq!(harness.calls(), vec!["npm ci", "npm run start"]);
    assert!(project.join("node_modules").is_dir());
    Ok(())
}

#[test]
#[serial]
fn scaffolds_empty_root_then_launches() -> Result<()> {
    let harness = Harness::new()?;

    harness
        .command()?
        .assert()
        .success()
        .stdout(predicate::str::contains("fake app running dev"));

    assert_eq!(
        harness.calls(),
        vec![
            "npx --yes create-video@latest --template blank --language ts --package-manager npm --yes .",
            "npm install",
            "npm run dev",
        ]
    );
    assert!(harness.root().join("package.json").is_file());
    Ok(())
}

#[test]
#[serial]
fn exhausted_scaffolding_idles_with_manual_hint() -> Result<()> {
    let harness = Harness::new()?;

    harness
        .command()?
        .env("FAKE_SCAFFOLD_FAIL", "1")
        .arg("--exit-on-idle")
        .assert()
        .success()
        .stderr(predicate::str::contains("create the project manually"));

    let calls = harness.calls();
    assert_eq!(calls.len(), 3, "{calls:#?}");
    assert!(calls[1].contains("-t blank -l ts -p npm -y ."));
    assert_eq!(calls[2], "npx --yes create-video@latest .");
    assert!(!harness.root().join("package.json").exists());
    Ok(())
}

#[test]
#[serial]
fn auto_init_disabled_runs_nothing() -> Result<()> {
    let harness = Harness::new()?;

    harness
        .command()?
        .env("LAUNCHPAD_AUTO_INIT", "false")
        .arg("--exit-on-idle")
        .assert()
        .success();

    assert!(harness.calls().is_empty());
    assert_eq!(fs::read_dir(harness.root())?.count(), 0);
    Ok(())
}

#[test]
#[serial]
fn descriptor_without_entry_script_installs_then_idles() -> Result<()> {
    let harness = Harness::new()?;
    harness.write_project(".", r#"{"name":"lib","scripts":{"build":"tsc"}}"#)?;

    harness
        .command()?
        .arg("--exit-on-idle")
        .assert()
        .success()
        .stderr(predicate::str::contains("neither a \"dev\" nor a \"start\" script"));

    assert_eq!(harness.calls(), vec!["npm install"]);
    Ok(())
}

#[test]
#[serial]
fn failed_install_exits_non_zero() -> Result<()> {
    let harness = Harness::new()?;
    harness.write_project(".", DEV_PROJECT)?;

    harness
        .command()?
        .env("FAKE_INSTALL_EXIT", "7")
        .assert()
        .failure()
        .stderr(predicate::str::contains("`npm install` exited with exit code 7"));

    assert_eq!(harness.calls(), vec!["npm install"]);
    Ok(())
}

#[test]
#[serial]
fn failed_exec_exits_non_zero() -> Result<()> {
    let harness = Harness::new()?;
    harness.write_project(".", DEV_PROJECT)?;
    fs::create_dir(harness.root().join("node_modules"))?;
    harness.remove_tool("npm")?;

    harness
        .command()?
        .env("PATH", harness.tools_dir())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot hand off to the \"dev\" script"))
        .stderr(predicate::str::contains("failed to exec `npm`"));
    Ok(())
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            child.kill()?;
            anyhow::bail!("launcher still running {limit:?} after SIGTERM");
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[test]
#[serial]
fn idle_launcher_stays_up_until_sigterm() -> Result<()> {
    let harness = Harness::new()?;
    let mut child = harness
        .std_command()?
        .env("LAUNCHPAD_AUTO_INIT", "false")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    std::thread::sleep(Duration::from_secs(1));
    if let Some(status) = child.try_wait()? {
        anyhow::bail!("launcher left the wait state on its own: {status}");
    }

    let kill = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()?;
    assert!(kill.success());

    let status = wait_with_deadline(&mut child, Duration::from_secs(10))?;
    assert!(status.success(), "{status}");
    assert!(harness.calls().is_empty());
    Ok(())
}

#[test]
#[serial]
fn project_dir_escaping_root_is_rejected() -> Result<()> {
    let harness = Harness::new()?;

    harness
        .command()?
        .args(["--project-dir", "/etc", "--exit-on-idle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--project-dir"));

    assert!(harness.calls().is_empty());
    Ok(())
}

#[test]
#[serial]
fn invalid_environment_value_is_rejected() -> Result<()> {
    let harness = Harness::new()?;

    harness
        .command()?
        .env("LAUNCHPAD_AUTO_INIT", "maybe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("LAUNCHPAD_AUTO_INIT"));

    assert!(harness.calls().is_empty());
    Ok(())
}

#[test]
#[serial]
fn check_prints_plan_without_running_anything() -> Result<()> {
    let harness = Harness::new()?;
    let project = harness.write_project("video", DEV_PROJECT)?;

    let output = harness
        .command()?
        .env("LAUNCHPAD_PACKAGE_MANAGER", "yarn")
        .args(["--check", "--package-manager", "pnpm"])
        .output()?;
    assert!(output.status.success());

    let plan: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(plan["project"]["resolved_by"], "subdirectory");
    assert_eq!(plan["install_plan"], "flexible");
    assert_eq!(plan["install"]["program"], "pnpm");
    assert_eq!(plan["launch"]["script"], "dev");
    assert_eq!(plan["launch"]["invocation"]["args"][1], "dev");
    assert!(plan["idle"].is_null());

    assert!(harness.calls().is_empty());
    assert!(!project.join("node_modules").exists());
    Ok(())
}
