use clap::Parser;
use launchpad_cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    launchpad_cli::init_tracing(cli.log_level.as_deref());
    launchpad_cli::run_main(cli).await
}
