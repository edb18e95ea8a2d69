//! Command-line surface of the `launchpad` container entrypoint.
//!
//! Flags mirror the `LAUNCHPAD_*` environment variables and win over them.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use launchpad_core::config::{
    LaunchConfig, PackageManager, parse_command, parse_project_dir,
};
use launchpad_core::idle::wait_for_termination;
use launchpad_core::process::{ExecReplacer, TokioCommandRunner};
use launchpad_core::startup::{self, Outcome, Startup};
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Resolve, scaffold, install and exec a Node project.
#[derive(Debug, Parser)]
#[command(name = "launchpad", version)]
pub struct Cli {
    /// Root search path for the project.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Project directory relative to the root; skips the search when it
    /// holds a package.json.
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<String>,

    /// Never scaffold; wait for a project to be mounted instead.
    #[arg(long)]
    pub no_auto_init: bool,

    /// Template passed to the scaffolding tool.
    #[arg(long)]
    pub template: Option<String>,

    /// Language passed to the scaffolding tool.
    #[arg(long)]
    pub language: Option<String>,

    /// Package manager used to scaffold, install and launch.
    #[arg(long, value_name = "NAME")]
    pub package_manager: Option<PackageManager>,

    /// Scaffolding tool command line, shell-quoted.
    #[arg(long, value_name = "COMMAND")]
    pub scaffold_command: Option<String>,

    /// Exit 0 when there is nothing to launch instead of waiting for a signal.
    #[arg(long)]
    pub exit_on_idle: bool,

    /// Print the startup plan as JSON and exit without running anything.
    #[arg(long)]
    pub check: bool,

    /// Log filter directives (overrides RUST_LOG).
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Layer flags over an environment-derived configuration.
    pub fn apply(&self, config: &mut LaunchConfig) -> anyhow::Result<()> {
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(dir) = &self.project_dir {
            config.project_dir = Some(parse_project_dir("--project-dir", dir)?);
        }
        if self.no_auto_init {
            config.auto_init = false;
        }
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(package_manager) = self.package_manager {
            config.package_manager = package_manager;
        }
        if let Some(command) = &self.scaffold_command {
            config.scaffold_command = parse_command("--scaffold-command", command)?;
        }
        if self.exit_on_idle {
            config.exit_on_idle = true;
        }
        Ok(())
    }

    /// Environment configuration with this invocation's flags applied.
    pub fn config(&self) -> anyhow::Result<LaunchConfig> {
        let mut config =
            LaunchConfig::from_env().context("invalid launcher environment configuration")?;
        self.apply(&mut config)?;
        Ok(config)
    }
}

/// Install the global subscriber. Logs go to stderr; stdout belongs to the
/// application.
pub fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config()?;

    if cli.check {
        let plan = startup::plan(&config);
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        writeln!(std::io::stdout().lock(), "{json}").context("failed to write plan")?;
        return Ok(());
    }

    tracing::info!("launchpad v{} starting", env!("CARGO_PKG_VERSION"));
    let runner = TokioCommandRunner;
    let replacer = ExecReplacer;
    let outcome = Startup::new(&config, &runner, &replacer).run().await?;

    match outcome {
        Outcome::Launched(launch) => {
            tracing::debug!("\"{}\" script handed off", launch.script);
        }
        Outcome::Idle(reason) => {
            tracing::info!("idle: {reason:?}");
            if config.exit_on_idle {
                tracing::info!("exit-on-idle set; exiting");
                return Ok(());
            }
            tracing::info!("waiting for SIGTERM or SIGINT");
            wait_for_termination().await;
        }
    }
    Ok(())
}
