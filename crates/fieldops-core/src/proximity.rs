//! "Who is available near here?" queries.

use std::sync::Arc;

use crate::{
  Error, Result,
  geo::SpatialPoint,
  personnel::{PersonnelStatus, PersonnelSummary},
  store::PersonnelStore,
};

/// Search radius used when the caller does not give one.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Radius search over the store's spatial index, restricted to available
/// personnel and projected onto [`PersonnelSummary`].
pub struct ProximitySearch<S> {
  store: Arc<S>,
}

impl<S> Clone for ProximitySearch<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: PersonnelStore> ProximitySearch<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Available personnel whose reporting location is within `radius_km`
  /// (great-circle, default [`DEFAULT_RADIUS_KM`]) of `point`.
  ///
  /// Results come back nearest first, although callers should only rely on
  /// the radius and availability filters.
  pub async fn find_nearby(
    &self,
    point: SpatialPoint,
    radius_km: Option<f64>,
  ) -> Result<Vec<PersonnelSummary>, S::Error> {
    let radius_km = resolve_radius(radius_km)?;

    let mut matches = self
      .store
      .find_nearby(point, radius_km, Some(PersonnelStatus::Available))
      .await?;
    matches.retain(|m| m.record.is_available() && m.distance_km <= radius_km);

    tracing::debug!(radius_km, matches = matches.len(), "proximity search");
    Ok(matches.iter().map(|m| m.record.summary()).collect())
  }
}

/// Apply the default and reject non-positive or NaN radii.
pub fn resolve_radius(radius_km: Option<f64>) -> Result<f64> {
  let radius_km = radius_km.unwrap_or(DEFAULT_RADIUS_KM);
  if radius_km.is_nan() || radius_km <= 0.0 {
    return Err(Error::InvalidArgument(format!(
      "radius must be positive, got {radius_km}"
    )));
  }
  Ok(radius_km)
}
