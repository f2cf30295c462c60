//! Status and version endpoint handlers

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::server::startup::AppState;
use crate::server::types::{
  ApiInfoResponse, ApiVersions, BaseResponse, StatusResponse, VersionResponse,
};

/// GET /status - Liveness plus whether the event index is ready
pub async fn status(State(state): State<AppState>) -> Json<BaseResponse<StatusResponse>> {
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    index_ready: state.chat.index().live().is_some(),
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /version - Returns current API version
pub async fn version() -> Json<BaseResponse<VersionResponse>> {
  let response = VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /api - Returns API information and supported versions
pub async fn api_info() -> Json<BaseResponse<ApiInfoResponse>> {
  let version = env!("CARGO_PKG_VERSION");
  let response = ApiInfoResponse {
    latest: version.to_string(),
    versions: ApiVersions { latest: version.to_string(), active: vec![version.to_string()] },
  };

  Json(BaseResponse::success(response, Uuid::new_v4()))
}
