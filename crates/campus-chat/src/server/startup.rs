//! REST server startup and configuration

use anyhow::Result;
use axum::serve;
use crier::service_log::ServiceLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::chat::ChatService;
use crate::config::ServerArgs;
use crate::events::JsonEventStore;
use crate::server::routing::create_router;

const COMPONENT: &str = "chat-server";

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
  pub chat: Arc<ChatService>,
  pub logs: ServiceLog,
}

impl AppState {
  pub fn new(chat: Arc<ChatService>, logs: ServiceLog) -> Self {
    Self { chat, logs }
  }
}

/// Build the chat service from `args` and serve until shutdown
pub async fn start_server(args: ServerArgs) -> Result<()> {
  let logs = ServiceLog::new(args.log_file())?;
  let events = Arc::new(JsonEventStore::new(args.events_file()));
  let chat = Arc::new(ChatService::from_config(args.to_config(), events));

  logs.info(&format!("Starting campus chat server on {}", args.bind), COMPONENT).await;
  chat.initialize().await;

  if args.background_refresh {
    spawn_background_refresh(chat.clone(), logs.clone(), chat.config().refresh_interval);
  }

  let state = AppState::new(chat, logs.clone());
  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(args.bind).await?;
  logs.info(&format!("Server listening on {}", args.bind), COMPONENT).await;

  match serve(listener, app).await {
    Ok(()) => {
      logs.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      logs.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}

/// Keep the index fresh between requests so chat latency never pays for a rebuild
fn spawn_background_refresh(chat: Arc<ChatService>, logs: ServiceLog, interval: Duration) {
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    loop {
      ticker.tick().await;
      if let Err(e) = chat.refresh_if_stale().await {
        logs.warn(&format!("Background index refresh failed: {e}"), COMPONENT).await;
      }
    }
  });
}
