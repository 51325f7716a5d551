use anyhow::Result;
use clap::Parser;
use study_companion::app::{self, AppContext, AppPaths, Cli};
use study_companion::config::StudyConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let paths = AppPaths::from_home()?;
    let mut config = StudyConfig::resolve(cli.config.as_deref(), &paths.config)?;
    if let Some(remote) = cli.remote {
        config.remote.kind = remote.into();
    }

    let mut ctx = AppContext::open(config, paths)?;
    let mut stdout = std::io::stdout();
    app::commands::run(&mut ctx, cli.command, &mut stdout).await
}
