use crate::error::GlyphError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A [`GlyphError`] on its way out as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub GlyphError);

impl From<GlyphError> for ApiError {
    fn from(err: GlyphError) -> Self {
        ApiError(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError(GlyphError::Storage(format!("registry task failed: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log::warn!("request failed: {}", self.0);
        } else {
            log::debug!("request rejected ({status}): {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
