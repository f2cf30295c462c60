use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::cli::client::get_client;
use crate::index::BuildOutcome;

/// Ask the chatbot a question, optionally about an image
pub async fn ask(message: &str, image: Option<&Path>) -> Result<()> {
  let client = get_client();
  let reply = match image {
    Some(path) => client.chat_with_image(message, path).await?,
    None => client.chat(message).await?,
  };

  println!("{reply}");
  Ok(())
}

/// Rebuild the server's event index
pub async fn reindex() -> Result<()> {
  let response = get_client().update_index().await?;

  let marker = match response.outcome {
    BuildOutcome::Built { .. } => "✓".green(),
    BuildOutcome::AlreadyRunning | BuildOutcome::NoEvents => "•".yellow(),
  };
  println!("{marker} {}", response.message);
  Ok(())
}

pub async fn health() -> Result<()> {
  let response = get_client().health().await?;
  let health = response.health;

  println!("{} {}", response.service.bold(), response.status.green());

  let index_state = if health.initialized { "ready".green() } else { "not built".yellow() };
  println!("  Index:      {index_state} ({} events)", health.index.documents);
  match health.last_build_time {
    Some(built_at) => println!("  Last build: {}", built_at.to_rfc3339().cyan()),
    None => println!("  Last build: {}", "never".dimmed()),
  }

  println!("  Embeddings: {}", health.models.embeddings.cyan());
  println!("  Chat:       {}", health.models.chat.cyan());
  println!("  Multimodal: {}", health.models.multimodal.cyan());

  if health.available_models.is_empty() {
    println!("  {}", "No models reported by Ollama".dimmed());
  } else {
    println!("  Installed models:");
    for model in health.available_models {
      println!("    {} {}", "•".blue(), model.name);
    }
  }

  Ok(())
}

pub async fn events(event_type: Option<&str>, subtype: Option<&str>) -> Result<()> {
  let response = get_client().events(event_type, subtype).await?;

  if response.events.is_empty() {
    println!("No events found.");
    return Ok(());
  }

  for event in &response.events {
    let title = event.title.as_deref().unwrap_or("Untitled");
    println!("{} {} {}", event.date.cyan(), title.bold(), format!("({})", event.event_type).dimmed());
    println!("    {} · {}", event.organization_label(), event.location.as_deref().unwrap_or("TBA"));
  }
  println!("\n{} events", response.count);

  Ok(())
}

pub async fn logs(limit: usize, level: &str) -> Result<()> {
  let response = get_client().logs(limit, level).await?;

  if response.logs.is_empty() {
    println!("No log entries.");
    return Ok(());
  }

  for entry in response.logs {
    let level = match entry.level.as_str() {
      "error" => entry.level.red(),
      "warn" => entry.level.yellow(),
      "success" => entry.level.green(),
      _ => entry.level.blue(),
    };
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    println!("{} [{}] {}: {}", timestamp.dimmed(), level, entry.component.cyan(), entry.message);
  }

  Ok(())
}
