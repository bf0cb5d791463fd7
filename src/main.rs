//! Attendance Bot - Main entry point.

use anyhow::Result;
use attendance_bot::channels;
use attendance_bot::config::Config;
use attendance_bot::logging::init_logging;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "attendance-bot", version, about = "Conversational attendance calculator")]
struct Cli {
    /// Path to the config file (default: ~/.config/attendance-bot/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot on the configured channel
    Start {
        /// Use the interactive CLI channel instead of Telegram
        #[arg(long)]
        cli: bool,
    },
    /// Health-check the configured channels
    Doctor,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_str_path(path)?,
        None => Config::load()?,
    };

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("attendance-bot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Commands::Start { cli: false }) {
        Commands::Start { cli: force_cli } => channels::start_channels(&config, force_cli).await,
        Commands::Doctor => {
            println!("Channels:");
            channels::doctor_channels(&config).await
        }
        Commands::Config => {
            let mut shown = config.clone();
            if let Some(tg) = shown.telegram.as_mut() {
                if !tg.bot_token.is_empty() {
                    tg.bot_token = "<redacted>".to_string();
                }
            }
            println!("{}", toml::to_string_pretty(&shown)?);
            Ok(())
        }
    }
}
