//! Campus Chat REST Server
//!
//! Serves the chatbot and read-only event listings over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use campus_chat::config::ServerArgs;
use campus_chat::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
  let args = ServerArgs::parse();

  let filter = if args.verbose {
    EnvFilter::new("campus_chat=debug,tower_http=debug,info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("campus_chat=info,warn"))
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  crier::info!("Starting Campus Chat server v{}", env!("CARGO_PKG_VERSION"));
  crier::info!("Binding to address: {}", args.bind);

  start_server(args).await?;

  Ok(())
}
