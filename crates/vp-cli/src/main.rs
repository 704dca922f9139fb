use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vp_cli::commands::{csv, plot};
use vp_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match command {
        Commands::Csv {
            query,
            json,
            output,
        } => csv::run(query, &config, *json, output.as_deref())?,
        Commands::Plot { query, output } => plot::run(query, &config, output)?,
    }

    Ok(())
}
