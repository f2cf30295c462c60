//! Read-only event listings

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::Json,
};
use uuid::Uuid;

use crate::events::EventFilter;
use crate::server::handlers::{error_response, HandlerError};
use crate::server::startup::AppState;
use crate::server::types::{BaseResponse, EventsQuery, EventsResponse};

const DEFAULT_LIMIT: usize = 100;

async fn find_events(
  state: &AppState,
  filter: EventFilter,
  limit: usize,
) -> Result<Json<BaseResponse<EventsResponse>>, HandlerError> {
  let transaction_id = Uuid::new_v4();

  match state.chat.events().find(&filter, limit).await {
    Ok(events) => {
      let count = events.len();
      Ok(Json(BaseResponse::success(EventsResponse { events, count }, transaction_id)))
    }
    Err(e) => Err(error_response(
      StatusCode::INTERNAL_SERVER_ERROR,
      "events_query_failed",
      &e.to_string(),
      transaction_id,
    )),
  }
}

/// GET /api/events - Events matching optional type, subtype and organization
pub async fn list_events(
  State(state): State<AppState>,
  Query(query): Query<EventsQuery>,
) -> Result<Json<BaseResponse<EventsResponse>>, HandlerError> {
  find_events(&state, query.filter(), query.limit.unwrap_or(DEFAULT_LIMIT)).await
}

/// GET /api/events/category/{category} - Events with the given subtype
pub async fn events_by_category(
  State(state): State<AppState>,
  Path(category): Path<String>,
) -> Result<Json<BaseResponse<EventsResponse>>, HandlerError> {
  let filter = EventFilter { subtype: Some(category), ..EventFilter::default() };
  find_events(&state, filter, DEFAULT_LIMIT).await
}
