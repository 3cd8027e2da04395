//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use lodge_core::policy::DenyReason;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Denied(DenyReason),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  Validation(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<lodge_core::Error> for ApiError {
  fn from(err: lodge_core::Error) -> Self {
    match err {
      lodge_core::Error::Denied(reason) => ApiError::Denied(reason),
      lodge_core::Error::NotFound { entity, id } => {
        ApiError::NotFound(format!("{entity} {id} not found"))
      }
      lodge_core::Error::Validation(msg) => ApiError::Validation(msg),
      lodge_core::Error::Conflict(msg) => ApiError::Conflict(msg),
      lodge_core::Error::Configuration(msg) => ApiError::Configuration(msg),
      lodge_core::Error::Store(source) => ApiError::Store(source),
    }
  }
}

/// Wrap a store backend error for propagation as a 500.
pub fn store_err<E>(err: E) -> ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  ApiError::Store(Box::new(err))
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Denied(reason) => (StatusCode::FORBIDDEN, reason.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
      }
      ApiError::Configuration(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
