//! Reverse-geocoding pass-through for `GET /reverse-geocode?lat=&lon=`.
//!
//! The upstream JSON is returned unchanged. Upstream failures become
//! `502 Bad Gateway`.

use std::{sync::Arc, time::Duration};

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fieldops_core::geo::SpatialPoint;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error(transparent)]
  Invalid(#[from] fieldops_core::Error),

  #[error("geocoder request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("geocoder responded with status {0}")]
  Status(u16),
}

impl IntoResponse for GeocodeError {
  fn into_response(self) -> Response {
    let status = match &self {
      GeocodeError::Invalid(_) => StatusCode::BAD_REQUEST,
      GeocodeError::Request(_) | GeocodeError::Status(_) => {
        tracing::warn!(error = %self, "reverse geocoding failed");
        StatusCode::BAD_GATEWAY
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

/// Client for an Open-Meteo compatible reverse-geocoding endpoint.
pub struct Geocoder {
  client: Client,
  url:    String,
}

impl Geocoder {
  pub fn new(url: impl Into<String>) -> Result<Self, GeocodeError> {
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    Ok(Self { client, url: url.into() })
  }

  /// Look up the place at `point`.
  pub async fn reverse(&self, point: &SpatialPoint) -> Result<Value, GeocodeError> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[
        ("latitude", point.latitude().to_string()),
        ("longitude", point.longitude().to_string()),
        ("language", "en".to_owned()),
      ])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(GeocodeError::Status(status.as_u16()));
    }
    Ok(resp.json().await?)
  }
}

#[derive(Debug, Deserialize)]
pub struct ReverseParams {
  pub lat: f64,
  pub lon: f64,
}

/// `GET /reverse-geocode?lat=<lat>&lon=<lon>`
pub async fn handler(
  State(geocoder): State<Arc<Geocoder>>,
  Query(params): Query<ReverseParams>,
) -> Result<Json<Value>, GeocodeError> {
  let point = SpatialPoint::new(params.lat, params.lon, "")?;
  Ok(Json(geocoder.reverse(&point).await?))
}
