//! The dispatch state machine.
//!
//! ```text
//!            assign_location               assign_location
//!  available ───────────────▶ assigned ─────────────────▶ assigned
//!      ▲                          │
//!      └──── update(available) ───┘
//! ```
//!
//! Every store write computes the record's `(status, assigned_location)` pair
//! through [`DispatchState`], which keeps `assigned_location.is_some()` equal
//! to `status == Assigned`.

use crate::{Error, Result, geo::SpatialPoint, personnel::PersonnelStatus};

/// A `(status, assigned_location)` pair that satisfies the assignment
/// invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchState {
  status:            PersonnelStatus,
  assigned_location: Option<SpatialPoint>,
}

impl DispatchState {
  /// State of a freshly created record. Creating directly into `assigned`
  /// is refused: there is no location to pair it with.
  pub fn initial(requested: PersonnelStatus) -> Result<Self> {
    match requested {
      PersonnelStatus::Available => Ok(Self::available()),
      PersonnelStatus::Assigned => Err(Error::invalid(
        "new personnel cannot be created as assigned; use assign_location",
      )),
    }
  }

  /// State after a full update that requests `requested`, given the record's
  /// current assignment.
  ///
  /// `available` clears any assignment. `assigned` is only accepted when the
  /// record already holds an assignment, which is kept.
  pub fn after_update(
    current: Option<&SpatialPoint>,
    requested: PersonnelStatus,
  ) -> Result<Self> {
    match (requested, current) {
      (PersonnelStatus::Available, _) => Ok(Self::available()),
      (PersonnelStatus::Assigned, Some(location)) => {
        Ok(Self::assigned_to(location.clone()))
      }
      (PersonnelStatus::Assigned, None) => Err(Error::invalid(
        "status can only become assigned through assign_location",
      )),
    }
  }

  /// State after an assignment. Any previous assignment is overwritten.
  pub fn assigned_to(location: SpatialPoint) -> Self {
    Self {
      status:            PersonnelStatus::Assigned,
      assigned_location: Some(location),
    }
  }

  fn available() -> Self {
    Self { status: PersonnelStatus::Available, assigned_location: None }
  }

  pub fn status(&self) -> PersonnelStatus { self.status }

  pub fn assigned_location(&self) -> Option<&SpatialPoint> {
    self.assigned_location.as_ref()
  }

  pub fn into_parts(self) -> (PersonnelStatus, Option<SpatialPoint>) {
    (self.status, self.assigned_location)
  }
}

/// Whether a stored pair satisfies the assignment invariant.
pub fn is_consistent(
  status: PersonnelStatus,
  assigned_location: Option<&SpatialPoint>,
) -> bool {
  (status == PersonnelStatus::Assigned) == assigned_location.is_some()
}
