//! Dispatching personnel to a work location.

use std::sync::Arc;

use crate::{
  geo::SpatialPoint,
  personnel::{PersonnelRecord, require_government_id},
  store::PersonnelStore,
};

/// Use-case service for the `available → assigned` transition.
///
/// Callers address personnel by government id rather than record identity.
/// Re-assigning someone who is already assigned overwrites the previous
/// location (last write wins); releasing an assignment goes through
/// [`PersonnelStore::update`] with status `available`.
pub struct AssignmentService<S> {
  store: Arc<S>,
}

impl<S> Clone for AssignmentService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: PersonnelStore> AssignmentService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Assign the person holding `government_id` to `location`.
  ///
  /// Fails with `InvalidArgument` for a blank government id and `NotFound`
  /// when nobody holds it; in both cases nothing is written.
  pub async fn assign_location(
    &self,
    government_id: &str,
    location: SpatialPoint,
  ) -> Result<PersonnelRecord, S::Error> {
    require_government_id(government_id)?;

    let record = self.store.set_assignment(government_id, location).await?;
    tracing::info!(
      personnel_id = %record.id,
      government_id,
      location = record.assigned_location.as_ref().map(SpatialPoint::label),
      "assigned personnel"
    );
    Ok(record)
  }
}
