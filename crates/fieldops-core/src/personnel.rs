//! Personnel records, the single entity of the registry.
//!
//! A record carries contact details, a reporting location (indexed for
//! proximity search) and, while dispatched, an assigned location.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, geo::SpatialPoint};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned record identity. Never reused, never supplied by callers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonnelId(Uuid);

impl PersonnelId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for PersonnelId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for PersonnelId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for PersonnelId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0.hyphenated(), f)
  }
}

impl FromStr for PersonnelId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Uuid::parse_str(s.trim())
      .map(Self)
      .map_err(|_| Error::invalid(format!("malformed personnel id {s:?}")))
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Dispatch status. See [`crate::lifecycle`] for the transitions.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum PersonnelStatus {
  #[default]
  Available,
  Assigned,
}

impl PersonnelStatus {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A persisted personnel record.
///
/// `assigned_location` is `Some` exactly when `status` is
/// [`PersonnelStatus::Assigned`]; every store write path upholds this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelRecord {
  pub id:                 PersonnelId,
  pub name:               String,
  pub government_id:      String,
  pub phone_number:       String,
  pub reporting_location: SpatialPoint,
  pub assigned_location:  Option<SpatialPoint>,
  pub status:             PersonnelStatus,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl PersonnelRecord {
  /// Project onto the public search view.
  pub fn summary(&self) -> PersonnelSummary {
    PersonnelSummary {
      id:                 self.id,
      name:               self.name.clone(),
      government_id:      self.government_id.clone(),
      reporting_location: self.reporting_location.clone(),
      status:             self.status,
    }
  }

  pub fn is_available(&self) -> bool { self.status == PersonnelStatus::Available }
}

/// The view returned by proximity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelSummary {
  pub id:                 PersonnelId,
  pub name:               String,
  pub government_id:      String,
  pub reporting_location: SpatialPoint,
  pub status:             PersonnelStatus,
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PersonnelStore::create`] and
/// [`crate::store::PersonnelStore::update`].
///
/// Identity and timestamps are always set by the store; they are not accepted
/// from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelDraft {
  pub name:               String,
  #[serde(alias = "govtId")]
  pub government_id:      String,
  #[serde(alias = "phoneNo")]
  pub phone_number:       String,
  pub reporting_location: SpatialPoint,
  #[serde(default)]
  pub status:             PersonnelStatus,
}

impl PersonnelDraft {
  /// Convenience constructor with `status` set to `available`.
  pub fn new(
    name: impl Into<String>,
    government_id: impl Into<String>,
    phone_number: impl Into<String>,
    reporting_location: SpatialPoint,
  ) -> Self {
    Self {
      name: name.into(),
      government_id: government_id.into(),
      phone_number: phone_number.into(),
      reporting_location,
      status: PersonnelStatus::default(),
    }
  }

  /// Check the required text fields. Coordinates are already valid by
  /// construction of [`SpatialPoint`].
  pub fn validate(&self) -> Result<()> {
    require_non_empty("name", &self.name)?;
    require_government_id(&self.government_id)?;
    require_non_empty("phoneNumber", &self.phone_number)?;
    Ok(())
  }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::invalid(format!("{field} must not be empty")));
  }
  Ok(())
}

/// Reject a missing or blank government id.
pub fn require_government_id(government_id: &str) -> Result<()> {
  require_non_empty("governmentId", government_id)
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The `updated_at` value for a mutation of a record last touched at
/// `previous`. Always strictly later than `previous`, even if the wall clock
/// has not advanced.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
  let now = Utc::now();
  if now > previous {
    now
  } else {
    previous + Duration::microseconds(1)
  }
}
