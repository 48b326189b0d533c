//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use clash_core::{Error as DomainError, facade::FacadeError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<E> From<FacadeError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(err: FacadeError<E>) -> Self {
    match err {
      FacadeError::Domain(domain) => match domain {
        DomainError::NotFound(_) | DomainError::ParentNotFound(_) => {
          ApiError::NotFound(domain.to_string())
        }
        DomainError::NotAuthorized(_) => ApiError::Forbidden(domain.to_string()),
        // The remaining variants are all rejected-input.
        _ => ApiError::BadRequest(domain.to_string()),
      },
      FacadeError::Store(e) => ApiError::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
