//! harbormock - main entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use harbormock::{
    cli::{Cli, run_command},
    config::{Config, LogFormat},
    presets::register_builtin,
    registry::registry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("harbormock=info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    register_builtin(registry());

    run_command(cli.command, registry(), &config).await
}
