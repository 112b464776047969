//! notekeep CLI

use clap::Parser;
use notekeep::{Cli, load_config, run};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    log::info!("notekeep v{}", env!("CARGO_PKG_VERSION"));

    let stdout = std::io::stdout();
    run(cli, config, &mut stdout.lock())
}
