//! Chatbot endpoint handlers
//!
//! Chat endpoints always answer 200 with text once the request itself is
//! valid; the chat service turns every downstream failure into a reply.

use axum::{
  extract::{Extension, Json, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use uuid::Uuid;

use crate::chat::ChatRequest;
use crate::index::BuildOutcome;
use crate::server::handlers::{error_response, HandlerError};
use crate::server::middleware::RequestContext;
use crate::server::startup::AppState;
use crate::server::types::{
  BaseResponse, ChatRequestBody, ChatResponseBody, HealthResponse, UpdateIndexResponse,
  UploadChatRequest,
};

const COMPONENT: &str = "chatbot-api";

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];

/// POST /api/chatbot/chat - Answer a text message
pub async fn chat(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(body): Json<ChatRequestBody>,
) -> Result<ResponseJson<BaseResponse<ChatResponseBody>>, HandlerError> {
  let transaction_id = Uuid::new_v4();

  if body.message.trim().is_empty() {
    return Err(error_response(
      StatusCode::BAD_REQUEST,
      "message_required",
      "Message is required",
      transaction_id,
    ));
  }

  let reply = state.chat.get_reply(ChatRequest::text(body.message)).await;
  context.log_success("Chat reply sent", COMPONENT).await;

  Ok(ResponseJson(BaseResponse::success(ChatResponseBody { response: reply.text }, transaction_id)))
}

/// Lowercased extension if it names an accepted image type
fn image_extension(filename: &str) -> Option<String> {
  let extension = Path::new(filename).extension()?.to_str()?.to_lowercase();
  ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()).then_some(extension)
}

/// POST /api/chatbot/upload-and-chat - Answer a message about an image
///
/// The image lives in a temp file only for the duration of the request.
pub async fn upload_and_chat(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(body): Json<UploadChatRequest>,
) -> Result<ResponseJson<BaseResponse<ChatResponseBody>>, HandlerError> {
  let transaction_id = Uuid::new_v4();
  let bad_request =
    |key: &str, message: &str| error_response(StatusCode::BAD_REQUEST, key, message, transaction_id);

  if body.image.trim().is_empty() {
    return Err(bad_request("image_required", "No file uploaded"));
  }

  let Some(extension) = image_extension(&body.filename) else {
    return Err(bad_request("invalid_image_type", "Only jpeg, jpg, png and gif images are allowed"));
  };

  let bytes = STANDARD
    .decode(body.image.trim())
    .map_err(|e| bad_request("invalid_image", &format!("Image is not valid base64: {e}")))?;

  if bytes.len() > MAX_IMAGE_BYTES {
    return Err(error_response(
      StatusCode::PAYLOAD_TOO_LARGE,
      "image_too_large",
      "Images are limited to 10 MiB",
      transaction_id,
    ));
  }

  let upload = tempfile::Builder::new()
    .prefix("campus-chat-upload-")
    .suffix(&format!(".{extension}"))
    .tempfile()
    .map_err(|e| {
      error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "upload_failed",
        &format!("Could not store upload: {e}"),
        transaction_id,
      )
    })?;

  if let Err(e) = tokio::fs::write(upload.path(), &bytes).await {
    context.log_error(&format!("Could not write upload: {e}"), COMPONENT).await;
    return Err(error_response(
      StatusCode::INTERNAL_SERVER_ERROR,
      "upload_failed",
      &format!("Could not store upload: {e}"),
      transaction_id,
    ));
  }

  let reply = state.chat.get_reply(ChatRequest::with_image(body.message, upload.path())).await;
  context.log_success(&format!("Image reply sent for {}", body.filename), COMPONENT).await;

  Ok(ResponseJson(BaseResponse::success(ChatResponseBody { response: reply.text }, transaction_id)))
}

/// POST /api/chatbot/update-index - Rebuild the event index now
pub async fn update_index(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> Result<ResponseJson<BaseResponse<UpdateIndexResponse>>, HandlerError> {
  let transaction_id = Uuid::new_v4();

  match state.chat.force_refresh().await {
    Ok(outcome) => {
      let message = match outcome {
        BuildOutcome::Built { documents } => format!("Event index updated with {documents} events"),
        BuildOutcome::AlreadyRunning => "An index update is already in progress".to_string(),
        BuildOutcome::NoEvents => "No events found, index left unchanged".to_string(),
      };
      match outcome {
        BuildOutcome::Built { .. } => context.log_success(&message, COMPONENT).await,
        _ => context.log_warn(&message, COMPONENT).await,
      }

      Ok(ResponseJson(BaseResponse::success(UpdateIndexResponse { message, outcome }, transaction_id)))
    }
    Err(e) => {
      context.log_error(&format!("Index update failed: {e}"), COMPONENT).await;
      Err(error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "index_update_failed",
        &format!("Failed to update event index: {e}"),
        transaction_id,
      ))
    }
  }
}

/// GET /api/chatbot/health - Index state and model configuration
pub async fn health(State(state): State<AppState>) -> ResponseJson<BaseResponse<HealthResponse>> {
  let response = HealthResponse {
    service: "Chatbot Service".to_string(),
    status: "online".to_string(),
    health: state.chat.health_status().await,
  };

  ResponseJson(BaseResponse::success(response, Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_image_extension() {
    assert_eq!(image_extension("poster.PNG").as_deref(), Some("png"));
    assert_eq!(image_extension("slides.final.jpeg").as_deref(), Some("jpeg"));
    assert_eq!(image_extension("notes.pdf"), None);
    assert_eq!(image_extension("no-extension"), None);
    assert_eq!(image_extension(""), None);
  }
}
