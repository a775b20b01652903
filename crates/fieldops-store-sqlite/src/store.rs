//! [`SqliteStore`], the SQLite implementation of [`PersonnelStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::{OptionalExtension as _, Transaction, TransactionBehavior};

use fieldops_core::{
  PersonnelRef,
  geo::{GeoBox, SpatialPoint, bounding_boxes},
  lifecycle::DispatchState,
  personnel::{
    PersonnelDraft, PersonnelId, PersonnelRecord, PersonnelStatus, next_timestamp,
  },
  store::{NearbyRecord, PersonnelStore},
};

use crate::{
  Error, Result,
  encode::{
    PERSONNEL_COLUMNS, RawPersonnel, encode_dt, encode_id, encode_point,
    encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A personnel repository backed by a single SQLite file.
///
/// All calls run on one dedicated connection thread, and every write is one
/// `IMMEDIATE` transaction covering both the `personnel` row and its
/// `personnel_locations` index entry.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Check that the spatial index holds exactly one entry per record, at the
  /// record's reporting location.
  pub async fn verify_index(&self) -> Result<bool> {
    let consistent = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT count(*) FROM personnel) = (SELECT count(*) FROM personnel_locations)
             AND NOT EXISTS (
               SELECT 1 FROM personnel p
               LEFT JOIN personnel_locations l ON l.id = p.row_id
               WHERE l.id IS NULL
                  OR p.reporting_lat NOT BETWEEN l.min_lat AND l.max_lat
                  OR p.reporting_lon NOT BETWEEN l.min_lon AND l.max_lon
             )",
          [],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;
    Ok(consistent)
  }

  /// Run a read query returning personnel rows.
  async fn query_personnel(
    &self,
    where_clause: &'static str,
    param: Option<String>,
  ) -> Result<Vec<RawPersonnel>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {PERSONNEL_COLUMNS} FROM personnel p {where_clause}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawPersonnel::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawPersonnel::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;
    Ok(raws)
  }
}

// ─── Transaction bodies ──────────────────────────────────────────────────────
//
// Each runs on the connection thread inside one immediate transaction and
// commits only on success; an early return drops the transaction, which
// rolls it back.

fn begin(conn: &mut rusqlite::Connection) -> Result<Transaction<'_>> {
  Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// Map a UNIQUE violation to `DuplicateKey` for `government_id`.
fn map_unique(e: rusqlite::Error, government_id: &str) -> Error {
  if is_unique_violation(&e) {
    fieldops_core::Error::DuplicateKey(government_id.to_owned()).into()
  } else {
    e.into()
  }
}

fn fetch_one(
  tx: &Transaction<'_>,
  column: &'static str,
  value: &str,
) -> Result<Option<(i64, PersonnelRecord)>> {
  let sql = format!("SELECT {PERSONNEL_COLUMNS} FROM personnel p WHERE p.{column} = ?1");
  tx.query_row(&sql, rusqlite::params![value], RawPersonnel::from_row)
    .optional()?
    .map(RawPersonnel::into_indexed)
    .transpose()
}

/// Whether `government_id` belongs to a record other than `except_row`.
fn government_id_taken(
  tx: &Transaction<'_>,
  government_id: &str,
  except_row: Option<i64>,
) -> Result<bool> {
  let taken = tx
    .query_row(
      "SELECT 1 FROM personnel WHERE government_id = ?1 AND row_id IS NOT ?2",
      rusqlite::params![government_id, except_row],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  Ok(taken)
}

fn insert_tx(conn: &mut rusqlite::Connection, record: PersonnelRecord) -> Result<PersonnelRecord> {
  let tx = begin(conn)?;

  if government_id_taken(&tx, &record.government_id, None)? {
    return Err(fieldops_core::Error::DuplicateKey(record.government_id).into());
  }

  let location = &record.reporting_location;
  let assigned = record.assigned_location.as_ref().map(encode_point).transpose()?;
  tx.execute(
    "INSERT INTO personnel (
       personnel_id, government_id, name, phone_number,
       reporting_lat, reporting_lon, reporting_label,
       assigned_location, status, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    rusqlite::params![
      encode_id(record.id),
      record.government_id,
      record.name,
      record.phone_number,
      location.latitude(),
      location.longitude(),
      location.label(),
      assigned,
      encode_status(record.status),
      encode_dt(record.created_at),
      encode_dt(record.updated_at),
    ],
  )
  .map_err(|e| map_unique(e, &record.government_id))?;

  let row_id = tx.last_insert_rowid();
  tx.execute(
    "INSERT INTO personnel_locations (id, min_lat, max_lat, min_lon, max_lon)
     VALUES (?1, ?2, ?2, ?3, ?3)",
    rusqlite::params![row_id, location.latitude(), location.longitude()],
  )?;

  tx.commit()?;
  Ok(record)
}

fn update_tx(
  conn: &mut rusqlite::Connection,
  id: PersonnelId,
  draft: PersonnelDraft,
) -> Result<PersonnelRecord> {
  let tx = begin(conn)?;

  let (row_id, current) = fetch_one(&tx, "personnel_id", &encode_id(id))?
    .ok_or(fieldops_core::Error::NotFound(PersonnelRef::Id(id)))?;

  if government_id_taken(&tx, &draft.government_id, Some(row_id))? {
    return Err(fieldops_core::Error::DuplicateKey(draft.government_id).into());
  }

  let (status, assigned_location) =
    DispatchState::after_update(current.assigned_location.as_ref(), draft.status)?
      .into_parts();

  let record = PersonnelRecord {
    id,
    name: draft.name,
    government_id: draft.government_id,
    phone_number: draft.phone_number,
    reporting_location: draft.reporting_location,
    assigned_location,
    status,
    created_at: current.created_at,
    updated_at: next_timestamp(current.updated_at),
  };

  let location = &record.reporting_location;
  let assigned = record.assigned_location.as_ref().map(encode_point).transpose()?;
  tx.execute(
    "UPDATE personnel SET
       government_id = ?2, name = ?3, phone_number = ?4,
       reporting_lat = ?5, reporting_lon = ?6, reporting_label = ?7,
       assigned_location = ?8, status = ?9, updated_at = ?10
     WHERE row_id = ?1",
    rusqlite::params![
      row_id,
      record.government_id,
      record.name,
      record.phone_number,
      location.latitude(),
      location.longitude(),
      location.label(),
      assigned,
      encode_status(record.status),
      encode_dt(record.updated_at),
    ],
  )
  .map_err(|e| map_unique(e, &record.government_id))?;

  let moved = current.reporting_location.latitude() != location.latitude()
    || current.reporting_location.longitude() != location.longitude();
  if moved {
    tx.execute(
      "UPDATE personnel_locations
       SET min_lat = ?2, max_lat = ?2, min_lon = ?3, max_lon = ?3
       WHERE id = ?1",
      rusqlite::params![row_id, location.latitude(), location.longitude()],
    )?;
  }

  tx.commit()?;
  Ok(record)
}

fn delete_tx(conn: &mut rusqlite::Connection, id: PersonnelId) -> Result<()> {
  let tx = begin(conn)?;

  let row_id: i64 = tx
    .query_row(
      "SELECT row_id FROM personnel WHERE personnel_id = ?1",
      rusqlite::params![encode_id(id)],
      |row| row.get(0),
    )
    .optional()?
    .ok_or(fieldops_core::Error::NotFound(PersonnelRef::Id(id)))?;

  tx.execute("DELETE FROM personnel_locations WHERE id = ?1", rusqlite::params![row_id])?;
  tx.execute("DELETE FROM personnel WHERE row_id = ?1", rusqlite::params![row_id])?;

  tx.commit()?;
  Ok(())
}

fn assign_tx(
  conn: &mut rusqlite::Connection,
  government_id: String,
  location: SpatialPoint,
) -> Result<PersonnelRecord> {
  let tx = begin(conn)?;

  let (row_id, current) = fetch_one(&tx, "government_id", &government_id)?
    .ok_or(fieldops_core::Error::NotFound(PersonnelRef::GovernmentId(government_id)))?;

  let (status, assigned_location) = DispatchState::assigned_to(location).into_parts();
  let record = PersonnelRecord {
    assigned_location,
    status,
    updated_at: next_timestamp(current.updated_at),
    ..current
  };

  let assigned = record.assigned_location.as_ref().map(encode_point).transpose()?;
  tx.execute(
    "UPDATE personnel SET assigned_location = ?2, status = ?3, updated_at = ?4
     WHERE row_id = ?1",
    rusqlite::params![
      row_id,
      assigned,
      encode_status(record.status),
      encode_dt(record.updated_at),
    ],
  )?;

  tx.commit()?;
  Ok(record)
}

fn nearby_rows(
  conn: &mut rusqlite::Connection,
  boxes: &[GeoBox],
  status: Option<&'static str>,
) -> rusqlite::Result<Vec<RawPersonnel>> {
  // One snapshot for all boxes.
  let tx = conn.transaction()?;
  let sql = format!(
    "SELECT {PERSONNEL_COLUMNS}
     FROM personnel_locations l
     JOIN personnel p ON p.row_id = l.id
     WHERE l.max_lat >= ?1 AND l.min_lat <= ?2
       AND l.max_lon >= ?3 AND l.min_lon <= ?4
       AND (?5 IS NULL OR p.status = ?5)"
  );

  let mut rows = Vec::new();
  {
    let mut stmt = tx.prepare(&sql)?;
    for b in boxes {
      let found = stmt
        .query_map(
          rusqlite::params![b.min_lat, b.max_lat, b.min_lon, b.max_lon, status],
          RawPersonnel::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      rows.extend(found);
    }
  }
  tx.commit()?;
  Ok(rows)
}

// ─── PersonnelStore impl ─────────────────────────────────────────────────────

impl PersonnelStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create(&self, draft: PersonnelDraft) -> Result<PersonnelRecord> {
    draft.validate()?;
    let (status, assigned_location) = DispatchState::initial(draft.status)?.into_parts();

    let now = Utc::now();
    let record = PersonnelRecord {
      id: PersonnelId::new(),
      name: draft.name,
      government_id: draft.government_id,
      phone_number: draft.phone_number,
      reporting_location: draft.reporting_location,
      assigned_location,
      status,
      created_at: now,
      updated_at: now,
    };

    let record = self.conn.call(move |conn| Ok(insert_tx(conn, record))).await??;
    tracing::debug!(personnel_id = %record.id, government_id = %record.government_id, "created personnel");
    Ok(record)
  }

  async fn update(&self, id: PersonnelId, draft: PersonnelDraft) -> Result<PersonnelRecord> {
    draft.validate()?;
    let record = self.conn.call(move |conn| Ok(update_tx(conn, id, draft))).await??;
    tracing::debug!(personnel_id = %id, status = %record.status, "updated personnel");
    Ok(record)
  }

  async fn delete(&self, id: PersonnelId) -> Result<()> {
    self.conn.call(move |conn| Ok(delete_tx(conn, id))).await??;
    tracing::debug!(personnel_id = %id, "deleted personnel");
    Ok(())
  }

  async fn set_assignment<'a>(
    &'a self,
    government_id: &'a str,
    location: SpatialPoint,
  ) -> Result<PersonnelRecord> {
    fieldops_core::personnel::require_government_id(government_id)?;
    let government_id = government_id.to_owned();
    let record = self
      .conn
      .call(move |conn| Ok(assign_tx(conn, government_id, location)))
      .await??;
    Ok(record)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_by_id(&self, id: PersonnelId) -> Result<PersonnelRecord> {
    self
      .query_personnel("WHERE p.personnel_id = ?1", Some(encode_id(id)))
      .await?
      .pop()
      .ok_or(fieldops_core::Error::NotFound(PersonnelRef::Id(id)))?
      .into_record()
  }

  async fn get_by_government_id<'a>(
    &'a self,
    government_id: &'a str,
  ) -> Result<PersonnelRecord> {
    fieldops_core::personnel::require_government_id(government_id)?;
    self
      .query_personnel("WHERE p.government_id = ?1", Some(government_id.to_owned()))
      .await?
      .pop()
      .ok_or_else(|| {
        fieldops_core::Error::NotFound(PersonnelRef::GovernmentId(government_id.to_owned()))
      })?
      .into_record()
  }

  async fn list_all(&self) -> Result<Vec<PersonnelRecord>> {
    self
      .query_personnel("", None)
      .await?
      .into_iter()
      .map(RawPersonnel::into_record)
      .collect()
  }

  async fn list_available(&self) -> Result<Vec<PersonnelRecord>> {
    self
      .query_personnel(
        "WHERE p.status = ?1",
        Some(encode_status(PersonnelStatus::Available).to_owned()),
      )
      .await?
      .into_iter()
      .map(RawPersonnel::into_record)
      .collect()
  }

  async fn find_nearby(
    &self,
    center: SpatialPoint,
    radius_km: f64,
    status: Option<PersonnelStatus>,
  ) -> Result<Vec<NearbyRecord>> {
    let boxes = bounding_boxes(&center, radius_km);
    let box_count = boxes.len();
    let status_str = status.map(encode_status);

    let raws = self
      .conn
      .call(move |conn| Ok(nearby_rows(conn, &boxes, status_str)?))
      .await?;

    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for raw in raws {
      if !seen.insert(raw.row_id) {
        continue;
      }
      let record = raw.into_record()?;
      let distance_km = center.distance_km(&record.reporting_location);
      if distance_km <= radius_km {
        matches.push(NearbyRecord { record, distance_km });
      }
    }
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    tracing::debug!(radius_km, boxes = box_count, matches = matches.len(), "radius query");
    Ok(matches)
  }
}
