//! Logs endpoint handler

use axum::{
  extract::{Extension, Query},
  http::StatusCode,
  response::Json,
};
use uuid::Uuid;

use crate::server::handlers::{error_response, HandlerError};
use crate::server::middleware::RequestContext;
use crate::server::types::{BaseResponse, LogsQuery, LogsResponse};

const DEFAULT_LIMIT: usize = 100;

/// GET /logs - Most recent service log entries
pub async fn get_logs(
  Extension(context): Extension<RequestContext>,
  Query(query): Query<LogsQuery>,
) -> Result<Json<BaseResponse<LogsResponse>>, HandlerError> {
  let transaction_id = Uuid::new_v4();
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

  match context.logger.get_logs(Some(limit), query.level.as_deref()).await {
    Ok(logs) => Ok(Json(BaseResponse::success(LogsResponse { logs }, transaction_id))),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      Err(error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "logs_read_failed",
        &format!("Failed to read logs: {e}"),
        transaction_id,
      ))
    }
  }
}
