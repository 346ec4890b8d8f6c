//! Language Learning CLI entry point.

use anyhow::Result;
use clap::Parser;
use language_learning::cli::{commands, Cli, Commands};
use language_learning::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging: RUST_LOG, then -v flags, then the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("language_learning={}", log_level)
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match cli.command {
        Commands::Run {
            story_file,
            refresh,
            min_familiarity,
            no_import,
            output_dir,
        } => {
            commands::run_lesson(
                story_file,
                refresh,
                min_familiarity,
                no_import,
                output_dir,
                settings,
            )
            .await?;
        }

        Commands::Vocab { refresh } => {
            commands::run_vocab(refresh, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
