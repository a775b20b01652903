//! SQL schema for the fieldops SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- `row_id` keys the spatial index; `personnel_id` is the public identity.
CREATE TABLE IF NOT EXISTS personnel (
    row_id             INTEGER PRIMARY KEY,
    personnel_id       TEXT    NOT NULL UNIQUE,
    government_id      TEXT    NOT NULL UNIQUE,
    name               TEXT    NOT NULL,
    phone_number       TEXT    NOT NULL,
    reporting_lat      REAL    NOT NULL CHECK (reporting_lat BETWEEN -90 AND 90),
    reporting_lon      REAL    NOT NULL CHECK (reporting_lon BETWEEN -180 AND 180),
    reporting_label    TEXT    NOT NULL,
    assigned_location  TEXT,            -- JSON-encoded SpatialPoint or NULL
    status             TEXT    NOT NULL, -- 'available' | 'assigned'
    created_at         TEXT    NOT NULL, -- RFC 3339 UTC; server-assigned
    updated_at         TEXT    NOT NULL,
    CHECK ((status = 'assigned') = (assigned_location IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS personnel_status_idx ON personnel(status);

-- One degenerate box per reporting location, keyed by personnel.row_id.
CREATE VIRTUAL TABLE IF NOT EXISTS personnel_locations USING rtree(
    id,
    min_lat, max_lat,
    min_lon, max_lon
);

PRAGMA user_version = 1;
";
