//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, the assigned location as compact JSON. The reporting location is
//! split into plain columns so it can be mirrored into the R*Tree.

use chrono::{DateTime, Utc};
use fieldops_core::{
  geo::SpatialPoint,
  lifecycle::is_consistent,
  personnel::{PersonnelId, PersonnelRecord, PersonnelStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_id(id: PersonnelId) -> String { id.as_uuid().hyphenated().to_string() }

pub fn decode_id(s: &str) -> Result<PersonnelId> { Ok(Uuid::parse_str(s)?.into()) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── PersonnelStatus ─────────────────────────────────────────────────────────

pub fn encode_status(s: PersonnelStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<PersonnelStatus> {
  s.parse()
    .map_err(|_| Error::CorruptRow(format!("unknown status: {s:?}")))
}

// ─── SpatialPoint ────────────────────────────────────────────────────────────

pub fn encode_point(p: &SpatialPoint) -> Result<String> {
  Ok(serde_json::to_string(p)?)
}

pub fn decode_point(s: &str) -> Result<SpatialPoint> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPersonnel::from_row`], for a `personnel p` alias.
pub const PERSONNEL_COLUMNS: &str = "p.row_id, p.personnel_id, p.government_id, \
   p.name, p.phone_number, p.reporting_lat, p.reporting_lon, p.reporting_label, \
   p.assigned_location, p.status, p.created_at, p.updated_at";

/// Raw values read directly from a `personnel` row.
pub struct RawPersonnel {
  pub row_id:            i64,
  pub personnel_id:      String,
  pub government_id:     String,
  pub name:              String,
  pub phone_number:      String,
  pub reporting_lat:     f64,
  pub reporting_lon:     f64,
  pub reporting_label:   String,
  pub assigned_location: Option<String>,
  pub status:            String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawPersonnel {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      row_id:            row.get(0)?,
      personnel_id:      row.get(1)?,
      government_id:     row.get(2)?,
      name:              row.get(3)?,
      phone_number:      row.get(4)?,
      reporting_lat:     row.get(5)?,
      reporting_lon:     row.get(6)?,
      reporting_label:   row.get(7)?,
      assigned_location: row.get(8)?,
      status:            row.get(9)?,
      created_at:        row.get(10)?,
      updated_at:        row.get(11)?,
    })
  }

  pub fn into_record(self) -> Result<PersonnelRecord> {
    let reporting_location =
      SpatialPoint::new(self.reporting_lat, self.reporting_lon, self.reporting_label)
        .map_err(|e| Error::CorruptRow(e.to_string()))?;
    let assigned_location = self
      .assigned_location
      .as_deref()
      .map(decode_point)
      .transpose()?;
    let status = decode_status(&self.status)?;

    if !is_consistent(status, assigned_location.as_ref()) {
      return Err(Error::CorruptRow(format!(
        "personnel {} has status {status} but assigned location {:?}",
        self.personnel_id, assigned_location
      )));
    }

    Ok(PersonnelRecord {
      id: decode_id(&self.personnel_id)?,
      name: self.name,
      government_id: self.government_id,
      phone_number: self.phone_number,
      reporting_location,
      assigned_location,
      status,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }

  /// Decode, keeping the row id that keys the spatial index.
  pub fn into_indexed(self) -> Result<(i64, PersonnelRecord)> {
    let row_id = self.row_id;
    Ok((row_id, self.into_record()?))
  }
}
