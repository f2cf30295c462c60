use anyhow::Result;
use campus_chat::cli::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campus-chat")]
#[command(about = "Campus Chat - ask the campus community hub about events")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", Smart Student Hub"))]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ask the chatbot a question
  Ask {
    /// The question to ask
    #[arg(required = true)]
    message: Vec<String>,
    /// Attach an image (jpeg, jpg, png or gif)
    #[arg(short, long)]
    image: Option<PathBuf>,
  },
  /// Rebuild the event index from the event store
  Reindex,
  /// Show index state and model configuration
  Health,
  /// List events
  Events {
    /// Filter by event type (e.g. "University Event")
    #[arg(short = 't', long = "type")]
    event_type: Option<String>,
    /// Filter by subtype
    #[arg(short, long)]
    subtype: Option<String>,
  },
  /// Query server logs for debugging and monitoring
  Logs {
    /// Maximum number of log entries to return
    #[arg(short, long, default_value = "50")]
    limit: usize,
    /// Filter by log level (info, warn, error, all)
    #[arg(long, default_value = "all")]
    level: String,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Ask { message, image } => commands::ask(&message.join(" "), image.as_deref()).await,
    Command::Reindex => commands::reindex().await,
    Command::Health => commands::health().await,
    Command::Events { event_type, subtype } => {
      commands::events(event_type.as_deref(), subtype.as_deref()).await
    }
    Command::Logs { limit, level } => commands::logs(limit, &level).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  handle(cli.command).await?;
  Ok(())
}
