//! Handlers for `/personnel` CRUD endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/personnel` | Every record |
//! | `POST`   | `/personnel` | Body: draft; 201, 409 on a taken government id |
//! | `GET`    | `/personnel/available` | Records with status `available` |
//! | `GET`    | `/personnel/government/{government_id}` | 404 if not found |
//! | `GET`    | `/personnel/{id}` | 400 on a malformed id, 404 if not found |
//! | `PUT`    | `/personnel/{id}` | Body: draft |
//! | `DELETE` | `/personnel/{id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use fieldops_core::{
  personnel::{PersonnelDraft, PersonnelId, PersonnelRecord},
  store::PersonnelStore,
};

use crate::{ApiState, JsonBody, error::ApiError};

fn parse_id(raw: &str) -> Result<PersonnelId, ApiError> { Ok(raw.parse()?) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /personnel`
pub async fn list<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PersonnelRecord>>, ApiError> {
  let records = state.store.list_all().await.map_err(ApiError::from_store)?;
  Ok(Json(records))
}

/// `GET /personnel/available`
pub async fn list_available<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<PersonnelRecord>>, ApiError> {
  let records = state
    .store
    .list_available()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /personnel`
pub async fn create<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  JsonBody(draft): JsonBody<PersonnelDraft>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .create(draft)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(id = %record.id, government_id = %record.government_id, "personnel created");
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /personnel/{id}`
pub async fn get_one<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<PersonnelRecord>, ApiError> {
  let id = parse_id(&id)?;
  let record = state
    .store
    .get_by_id(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `GET /personnel/government/{government_id}`
pub async fn get_by_government_id<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  Path(government_id): Path<String>,
) -> Result<Json<PersonnelRecord>, ApiError> {
  let record = state
    .store
    .get_by_government_id(&government_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

/// `PUT /personnel/{id}`
pub async fn update<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  JsonBody(draft): JsonBody<PersonnelDraft>,
) -> Result<Json<PersonnelRecord>, ApiError> {
  let id = parse_id(&id)?;
  let record = state
    .store
    .update(id, draft)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(record))
}

/// `DELETE /personnel/{id}`
pub async fn delete<S: PersonnelStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  let id = parse_id(&id)?;
  state.store.delete(id).await.map_err(ApiError::from_store)?;
  tracing::info!(%id, "personnel deleted");
  Ok(StatusCode::NO_CONTENT)
}
