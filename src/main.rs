use anyhow::{Context, Result};
use askchat::chat::{ChatBoard, ChatController};
use askchat::client::AskClient;
use askchat::config::{self, Config};
use askchat::events::EventHandler;
use askchat::tui;
use askchat::ui::conversation::{ConversationAction, ConversationManager};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter
const LOG_ENV: &str = "ASKCHAT_LOG";

#[derive(Parser)]
#[command(name = "askchat")]
#[command(version)]
#[command(about = "Chat with a product-info assistant from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the assistant API
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Path to a config file (default: ~/.askchat/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one question and print the reply
    Ask {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Print the backend's welcome message
    Status,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(std::env::var(config::ENDPOINT_ENV).ok(), cli.endpoint);

    match cli.command {
        None => {
            init_file_logging(&config)?;
            run_tui(config).await
        }
        Some(Commands::Ask { query }) => {
            init_stderr_logging();
            ask_once(&config, &query.join(" ")).await
        }
        Some(Commands::Status) => {
            init_stderr_logging();
            print_status(&config).await
        }
        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so logs go to a file
fn init_file_logging(config: &Config) -> Result<()> {
    config.ensure_home()?;
    let log_path = config.log_path();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

async fn ask_once(config: &Config, query: &str) -> Result<()> {
    let client = Arc::new(AskClient::new(config)?);
    let controller = ChatController::new(client, Arc::new(ChatBoard::new()));

    if let Some(reply) = controller.ask(query).await {
        println!("{reply}");
    }
    Ok(())
}

async fn print_status(config: &Config) -> Result<()> {
    let client = AskClient::new(config)?;
    let message = client
        .status()
        .await
        .with_context(|| format!("Failed to reach {}", client.endpoint()))?;
    println!("{message}");
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let client = Arc::new(AskClient::new(&config)?);
    info!(endpoint = %config.endpoint, timeout = ?client.timeout(), "starting chat");
    let controller = ChatController::new(client, Arc::new(ChatBoard::new()));
    let mut manager = ConversationManager::new(controller, config.ui.clone(), config.endpoint.clone());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(config.ui.tick_rate_ms));

    let result: Result<()> = async {
        loop {
            terminal
                .draw(|frame| manager.draw(frame))
                .context("Failed to draw")?;

            let Some(event) = events.next().await else {
                break;
            };
            if manager.handle_event(event) == ConversationAction::Exit {
                break;
            }
        }
        Ok(())
    }
    .await;

    tui::restore()?;

    let abandoned = manager.in_flight();
    if abandoned > 0 {
        info!(abandoned, "exiting with requests still in flight");
    }
    if let Err(err) = &result {
        error!(error = %err, "chat loop failed");
    }
    info!("chat closed");
    result
}
