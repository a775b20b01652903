//! The `PersonnelStore` trait: the personnel repository contract.
//!
//! The trait is implemented by storage backends (e.g.
//! `fieldops-store-sqlite`). The services in this crate and the HTTP layer
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  Error,
  geo::SpatialPoint,
  personnel::{PersonnelDraft, PersonnelId, PersonnelRecord, PersonnelStatus},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Bound on backend error types.
///
/// Backends wrap the domain [`Error`] taxonomy alongside their own storage
/// failures; [`StoreError::domain`] recovers the former so callers can tell a
/// missing record from a broken database.
pub trait StoreError: std::error::Error + From<Error> + Send + Sync + 'static {
  /// The domain failure behind this error, if it is one.
  fn domain(&self) -> Option<&Error>;
}

// ─── Query results ───────────────────────────────────────────────────────────

/// A record matched by a radius query, with its great-circle distance from
/// the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRecord {
  pub record:      PersonnelRecord,
  pub distance_km: f64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a personnel repository backend.
///
/// Implementations must keep the primary records and the spatial index in
/// lockstep: every write either commits both or neither, and no reader may
/// observe one without the other.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PersonnelStore: Send + Sync {
  type Error: StoreError;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate and persist a new record. Identity and timestamps are assigned
  /// by the store.
  ///
  /// Fails with [`Error::DuplicateKey`] if the government id is taken; the
  /// uniqueness check and the insert are atomic.
  fn create(
    &self,
    draft: PersonnelDraft,
  ) -> impl Future<Output = Result<PersonnelRecord, Self::Error>> + Send + '_;

  /// Replace the mutable fields of record `id`.
  ///
  /// The government id is re-checked against every *other* record. The
  /// assigned location follows [`crate::lifecycle::DispatchState::after_update`].
  fn update(
    &self,
    id: PersonnelId,
    draft: PersonnelDraft,
  ) -> impl Future<Output = Result<PersonnelRecord, Self::Error>> + Send + '_;

  /// Remove record `id` from storage and from the spatial index.
  fn delete(
    &self,
    id: PersonnelId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark the record with `government_id` as assigned to `location`.
  ///
  /// The lookup and the write are a single atomic step; concurrent calls for
  /// the same person serialise and the last one wins.
  fn set_assignment<'a>(
    &'a self,
    government_id: &'a str,
    location: SpatialPoint,
  ) -> impl Future<Output = Result<PersonnelRecord, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fails with [`Error::NotFound`] if absent.
  fn get_by_id(
    &self,
    id: PersonnelId,
  ) -> impl Future<Output = Result<PersonnelRecord, Self::Error>> + Send + '_;

  /// Fails with [`Error::NotFound`] if absent.
  fn get_by_government_id<'a>(
    &'a self,
    government_id: &'a str,
  ) -> impl Future<Output = Result<PersonnelRecord, Self::Error>> + Send + 'a;

  /// Every record, in no particular order.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonnelRecord>, Self::Error>> + Send + '_;

  /// Every record whose status is `available`.
  fn list_available(
    &self,
  ) -> impl Future<Output = Result<Vec<PersonnelRecord>, Self::Error>> + Send + '_;

  /// Records whose reporting location lies within `radius_km` of `center`,
  /// optionally restricted to one status, nearest first.
  fn find_nearby(
    &self,
    center: SpatialPoint,
    radius_km: f64,
    status: Option<PersonnelStatus>,
  ) -> impl Future<Output = Result<Vec<NearbyRecord>, Self::Error>> + Send + '_;
}
