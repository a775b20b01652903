//! JSON REST API for the fieldops personnel registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`fieldops_core::store::PersonnelStore`]. CORS and request logging are
//! left to the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(fieldops_api::api_router(store.clone()))
//! ```

pub mod assign;
pub mod error;
pub mod legacy;
pub mod personnel;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRequest,
  routing::{get, post, put},
};
use fieldops_core::{
  assignment::AssignmentService, proximity::ProximitySearch, store::PersonnelStore,
};

pub use error::ApiError;

/// JSON request body. Malformed input, including out-of-range coordinates,
/// is rejected as [`ApiError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:       Arc<S>,
  pub assignments: AssignmentService<S>,
  pub proximity:   ProximitySearch<S>,
}

impl<S: PersonnelStore> ApiState<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      assignments: AssignmentService::new(Arc::clone(&store)),
      proximity: ProximitySearch::new(Arc::clone(&store)),
      store,
    }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      assignments: self.assignments.clone(),
      proximity:   self.proximity.clone(),
    }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// Routes are served under `/personnel` and again under `/field_personnel`,
/// the paths used by the existing dispatch frontend. The `/field_personnel`
/// collection lists records in [`legacy::LegacyRecord`] form.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonnelStore + 'static,
{
  Router::new()
    .route(
      "/personnel",
      get(personnel::list::<S>).post(personnel::create::<S>),
    )
    .route(
      "/field_personnel",
      get(legacy::list::<S>).post(personnel::create::<S>),
    )
    .route(
      "/field_personnel/",
      get(legacy::list::<S>).post(personnel::create::<S>),
    )
    .merge(item_routes::<S>("/personnel"))
    .merge(item_routes::<S>("/field_personnel"))
    .with_state(ApiState::new(store))
}

/// Everything below the collection root of `prefix`.
fn item_routes<S>(prefix: &str) -> Router<ApiState<S>>
where
  S: PersonnelStore + 'static,
{
  Router::new()
    .route(
      &format!("{prefix}/available"),
      get(personnel::list_available::<S>),
    )
    .route(&format!("{prefix}/nearby"), post(search::nearby::<S>))
    .route(&format!("{prefix}/assign"), put(assign::assign::<S>))
    .route(
      &format!("{prefix}/government/{{government_id}}"),
      get(personnel::get_by_government_id::<S>),
    )
    .route(
      &format!("{prefix}/{{id}}"),
      get(personnel::get_one::<S>)
        .put(personnel::update::<S>)
        .delete(personnel::delete::<S>),
    )
}
