mod common;

use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crier::service_log::ServiceLog;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use campus_chat::events::EventCatalog;
use campus_chat::responders::prompts::EXTRACTION_EMPTY_MESSAGE;
use campus_chat::server::{create_router, AppState};
use common::{catalog, FakeEmbedder, FakeRecognizer, Harness, GENERATED_REPLY};

fn app(harness: &Harness) -> (Router, ServiceLog) {
  let logs = ServiceLog::new_with_silent(harness.temp.path().join("server.logs.jsonl"), true).unwrap();
  let state = AppState::new(Arc::new(harness.service()), logs.clone());
  (create_router(state), logs)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let request = Request::builder().method(method).uri(uri);
  let request = match body {
    Some(body) => request
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => request.body(Body::empty()).unwrap(),
  };

  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

#[tokio::test]
async fn test_chat_requires_a_message() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(&app, "POST", "/api/chatbot/chat", Some(json!({"message": "  "}))).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "message_required");
}

#[tokio::test]
async fn test_chat_answers_with_envelope() {
  let harness = Harness::new();
  let (app, logs) = app(&harness);

  let (status, body) =
    call(&app, "POST", "/api/chatbot/chat", Some(json!({"message": "When is Jazz Night?"}))).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["response"], GENERATED_REPLY);
  assert!(body["transaction_id"].is_string());
  assert_eq!(body["versioning"]["latest"], env!("CARGO_PKG_VERSION"));

  let entries = logs.get_logs(None, None).await.unwrap();
  let completed = entries.iter().find(|entry| entry.message == "Request completed").unwrap();
  let context = completed.context.as_ref().unwrap();
  assert_eq!(context.path.as_deref(), Some("/api/chatbot/chat"));
  assert_eq!(context.status_code, Some(200));
}

#[tokio::test]
async fn test_upload_rejects_non_image_types() {
  let harness = Harness::new();
  let (app, _) = app(&harness);
  let upload = json!({"message": "read this", "image": STANDARD.encode(b"%PDF"), "filename": "notes.pdf"});

  let (status, body) = call(&app, "POST", "/api/chatbot/upload-and-chat", Some(upload)).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "invalid_image_type");
  assert!(harness.recognizer.seen().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_missing_or_invalid_image() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(
    &app,
    "POST",
    "/api/chatbot/upload-and-chat",
    Some(json!({"message": "read this", "filename": "poster.png"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "image_required");

  let (status, body) = call(
    &app,
    "POST",
    "/api/chatbot/upload-and-chat",
    Some(json!({"message": "read this", "image": "not base64!", "filename": "poster.png"})),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["errors"][0]["key"], "invalid_image");
}

#[tokio::test]
async fn test_upload_runs_ocr_and_removes_the_file() {
  let harness = Harness::with_parts(FakeEmbedder::new(), FakeRecognizer::returning(" "), catalog());
  let (app, _) = app(&harness);
  let upload =
    json!({"message": "What does it say?", "image": STANDARD.encode(b"png-bytes"), "filename": "Poster.PNG"});

  let (status, body) = call(&app, "POST", "/api/chatbot/upload-and-chat", Some(upload)).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["response"], EXTRACTION_EMPTY_MESSAGE);

  let seen = harness.recognizer.seen();
  assert_eq!(seen.len(), 1);
  assert_eq!(seen[0].extension().and_then(|e| e.to_str()), Some("png"));
  assert!(!seen[0].exists());
}

#[tokio::test]
async fn test_update_index_reports_outcome_and_failures() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(&app, "POST", "/api/chatbot/update-index", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"]["status"], "built");
  assert_eq!(body["outcome"]["documents"], 5);

  harness.embedder.set_down(true);
  let (status, body) = call(&app, "POST", "/api/chatbot/update-index", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["errors"][0]["key"], "index_update_failed");
}

#[tokio::test]
async fn test_health_endpoint() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(&app, "GET", "/api/chatbot/health", None).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["service"], "Chatbot Service");
  assert_eq!(body["initialized"], false);
  assert_eq!(body["models"]["multimodal"], "llava:7b");
  assert_eq!(body["available_models"][0]["name"], "llava:7b");
}

#[tokio::test]
async fn test_event_listings() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(&app, "GET", "/api/events/category/Music", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["count"], 2);
  assert_eq!(body["events"][0]["title"], "Jazz Night");
  assert_eq!(body["events"][0]["organizationName"], "HKU Music Society");

  let (_, body) = call(&app, "GET", "/api/events?type=University%20Event&limit=1", None).await;
  assert_eq!(body["count"], 1);
  assert_eq!(body["events"][0]["eventId"], "E2");
}

#[tokio::test]
async fn test_status_and_logs_endpoints() {
  let harness = Harness::new();
  let (app, _) = app(&harness);

  let (status, body) = call(&app, "GET", "/status", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["index_ready"], false);

  let (status, body) = call(&app, "GET", "/logs?limit=5&level=info", None).await;
  assert_eq!(status, StatusCode::OK);
  let logs = body["logs"].as_array().unwrap();
  assert!(!logs.is_empty() && logs.len() <= 5);
  assert!(logs.iter().all(|entry| entry["level"] == "info"));
}

#[tokio::test]
async fn test_update_index_with_no_events_logs_a_warning() {
  let harness =
    Harness::with_parts(FakeEmbedder::new(), FakeRecognizer::failing(), EventCatalog::default());
  let (app, logs) = app(&harness);

  let (status, body) = call(&app, "POST", "/api/chatbot/update-index", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"]["status"], "no_events");

  let warnings = logs.get_logs(Some(100), Some("warn")).await.unwrap();
  assert!(warnings
    .iter()
    .any(|entry| entry.component == "chatbot-api" && entry.message.contains("No events found")));
}
