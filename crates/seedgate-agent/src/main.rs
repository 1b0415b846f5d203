use anyhow::Result;
use clap::Parser;

use seedgate_agent::cli::{Cli, Commands};
use seedgate_agent::output::print_error;
use seedgate_agent::{commands, observability};
use seedgate_config::{load_config, AppConfig};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    observability::init_tracing();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = cli.config.as_deref().unwrap_or("(defaults)"),
        "Configuration loaded"
    );

    // Apply the configured logging level now that config is available
    observability::apply_logging_level(&config.logging.level);

    if let Err(e) = dispatch(&cli, &config).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli, config: &AppConfig) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => commands::run::execute(config, args.oneshot).await,
        Commands::Wait => commands::wait::execute(config).await,
        Commands::SeedDb => commands::seed_db::execute(config).await,
        Commands::Plan => commands::plan::execute(config).await,
    }
}
