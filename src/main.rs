use clap::Parser;
use tick_subscriber::cli::{self, Cli};
use tick_subscriber::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    cli.apply(&mut config);
    config.validate()?;

    // Initialize telemetry
    tick_subscriber::telemetry::init_telemetry(&config.telemetry)?;

    cli::run(config).await
}
