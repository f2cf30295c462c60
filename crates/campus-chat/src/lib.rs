//! Campus Chat - Event Chatbot for the Campus Community Hub
//!
//! Answers student questions about campus events. Event-related messages are
//! grounded in a semantic index built from the event store; everything else
//! goes straight to a local Ollama model. Images are either read with OCR or
//! handed to a multimodal model.

pub mod chat;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod ocr;
pub mod ollama;
pub mod responders;
pub mod server;

pub use chat::{ChatReply, ChatRequest, ChatService, HealthStatus};
pub use config::ChatConfig;
pub use error::ChatError;
