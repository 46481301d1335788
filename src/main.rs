//! Story Weaver - command-line front end
//!
#![doc = "Main entry point for the Story Weaver application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storyweaver::cli::{Cli, Commands};
use storyweaver::commands;
use storyweaver::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Ask { text, mode } => {
            tracing::debug!("Ask in {} mode", mode);
            commands::ask::run_ask(config, text, mode).await
        }
        Commands::FollowUp { number, action } => {
            commands::follow_up::run_follow_up(config, number, action).await
        }
        Commands::Chat { mode, surface } => {
            if let Some(s) = &surface {
                tracing::debug!("Using surface override: {}", s);
            }
            commands::chat::run_chat(config, mode, surface).await
        }
        Commands::History { surface } => commands::history::handle_history(&config, surface),
        Commands::Clear { surface } => commands::settings::handle_clear(&config, surface),
        Commands::Scriptorium { command } => {
            commands::scriptorium::handle_scriptorium(config, command).await
        }
        Commands::Export { index, out } => commands::export::handle_export(&config, index, out),
        Commands::Theme { action } => commands::settings::handle_theme(&config, action),
        Commands::View { mode } => commands::settings::handle_view(&config, mode),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "storyweaver=debug"
    } else {
        "storyweaver=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
