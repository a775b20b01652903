//! Handler for `PUT /personnel/assign`.

use axum::{Json, extract::State};
use fieldops_core::{
  geo::SpatialPoint, personnel::PersonnelRecord, store::PersonnelStore,
};
use serde::Deserialize;

use crate::{ApiState, JsonBody, error::ApiError};

/// `personnelId` is the person's government id, not the record id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
  #[serde(default, alias = "personnel_id", alias = "governmentId")]
  pub personnel_id:      String,
  pub assigned_location: SpatialPoint,
}

/// `PUT /personnel/assign`
pub async fn assign<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<AssignBody>,
) -> Result<Json<PersonnelRecord>, ApiError> {
  let record = state
    .assignments
    .assign_location(&body.personnel_id, body.assigned_location)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}
