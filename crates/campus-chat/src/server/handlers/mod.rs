//! Endpoint handlers

pub mod chatbot;
pub mod events;
pub mod logs;
pub mod status;

use axum::{http::StatusCode, response::Json};
use uuid::Uuid;

use crate::server::types::{ApiError, BaseResponse};

pub type HandlerError = (StatusCode, Json<BaseResponse<()>>);

/// Error envelope with a single keyed error
pub(crate) fn error_response(
  status: StatusCode,
  key: &str,
  message: &str,
  transaction_id: Uuid,
) -> HandlerError {
  let error = ApiError::new(key, message);
  (status, Json(BaseResponse::<()>::error(vec![error], transaction_id)))
}
