//! Sofi AI - terminal chat client
//!
#![doc = "Sofi AI - terminal chat client"]
#![doc = "Main entry point for the sofi binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sofi_chat::cli::{Cli, Commands};
use sofi_chat::commands;
use sofi_chat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli.overrides())?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { no_animation } => {
            if no_animation {
                tracing::debug!("Reply animation disabled");
            }
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Status => {
            tracing::info!("Checking backend status");
            commands::status::run_status(&config).await?;
            Ok(())
        }
        Commands::Models { json } => {
            commands::models::list_models(&config, json).await?;
            Ok(())
        }
        Commands::Stats { json, reset } => {
            commands::stats::show_stats(&config, json, reset)?;
            Ok(())
        }
        Commands::Features => {
            commands::features::show_features();
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the chat on stdout.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "sofi_chat=debug"
    } else {
        "sofi_chat=warn"
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
