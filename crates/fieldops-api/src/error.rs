//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fieldops_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain failure it carries.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.domain() {
      Some(domain) => Self::from_domain(domain),
      None => {
        tracing::error!(error = %e, "store failure");
        Self::Store(Box::new(e))
      }
    }
  }

  fn from_domain(e: &fieldops_core::Error) -> Self {
    use fieldops_core::Error as E;
    match e {
      E::NotFound(_) => Self::NotFound(e.to_string()),
      E::DuplicateKey(_) => Self::Conflict(e.to_string()),
      E::InvalidArgument(_) => Self::BadRequest(e.to_string()),
    }
  }
}

impl From<fieldops_core::Error> for ApiError {
  fn from(e: fieldops_core::Error) -> Self { Self::from_domain(&e) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
