//! Record shape expected by the existing dispatch frontend.
//!
//! That client keys personnel by `govtId` and reads `phoneNo`; both are
//! emitted alongside the regular camelCase fields.

use axum::{Json, extract::State};
use fieldops_core::{personnel::PersonnelRecord, store::PersonnelStore};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
  #[serde(flatten)]
  pub record:   PersonnelRecord,
  pub govt_id:  String,
  pub phone_no: String,
}

impl From<PersonnelRecord> for LegacyRecord {
  fn from(record: PersonnelRecord) -> Self {
    Self {
      govt_id: record.government_id.clone(),
      phone_no: record.phone_number.clone(),
      record,
    }
  }
}

/// `GET /field_personnel/`
pub async fn list<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<LegacyRecord>>, ApiError> {
  let records = state.store.list_all().await.map_err(ApiError::from_store)?;
  Ok(Json(records.into_iter().map(LegacyRecord::from).collect()))
}
