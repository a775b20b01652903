//! Handler for `POST /personnel/nearby`.
//!
//! Body: `{"latitude": 19.07, "longitude": 72.87, "radiusKm": 5}`. The
//! radius is optional and defaults to
//! [`fieldops_core::proximity::DEFAULT_RADIUS_KM`].

use axum::{Json, extract::State};
use fieldops_core::{
  geo::SpatialPoint, personnel::PersonnelSummary, store::PersonnelStore,
};
use serde::Deserialize;

use crate::{ApiState, JsonBody, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyBody {
  pub latitude:  f64,
  pub longitude: f64,
  #[serde(default, alias = "radius_km")]
  pub radius_km: Option<f64>,
}

/// `POST /personnel/nearby`
pub async fn nearby<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<NearbyBody>,
) -> Result<Json<Vec<PersonnelSummary>>, ApiError> {
  let center = SpatialPoint::new(body.latitude, body.longitude, "")?;
  let found = state
    .proximity
    .find_nearby(center, body.radius_km)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(found))
}
