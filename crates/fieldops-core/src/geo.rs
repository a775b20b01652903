//! Geographic primitives: [`SpatialPoint`], great-circle distance and the
//! bounding boxes used to prefilter radius queries against a spatial index.
//!
//! All distances in the system are computed with [`EARTH_RADIUS_KM`]; mixing
//! radius constants makes results disagree at the metre scale.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius (IUGG), in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Widening applied to every bounding box edge, in degrees.
const BOX_PADDING_DEG: f64 = 1e-9;

// ─── SpatialPoint ────────────────────────────────────────────────────────────

/// A labelled latitude/longitude pair.
///
/// Immutable once constructed; the only way to obtain one is through
/// [`SpatialPoint::new`] (or deserialisation, which goes through the same
/// checks), so every instance satisfies the coordinate range invariant.
///
/// Serialises in the GeoJSON-like shape used by the persisted layout:
/// `{"type": "Point", "coordinates": [lon, lat], "name": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoJsonPoint", into = "GeoJsonPoint")]
pub struct SpatialPoint {
  latitude:  f64,
  longitude: f64,
  label:     String,
}

impl SpatialPoint {
  /// Build a point, rejecting non-finite or out-of-range coordinates.
  pub fn new(latitude: f64, longitude: f64, label: impl Into<String>) -> Result<Self> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
      return Err(Error::invalid(format!(
        "latitude {latitude} is outside [-90, 90]"
      )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
      return Err(Error::invalid(format!(
        "longitude {longitude} is outside [-180, 180]"
      )));
    }
    Ok(Self { latitude, longitude, label: label.into() })
  }

  pub fn latitude(&self) -> f64 { self.latitude }

  pub fn longitude(&self) -> f64 { self.longitude }

  pub fn label(&self) -> &str { &self.label }

  /// Great-circle distance to `other`, in kilometres.
  pub fn distance_km(&self, other: &SpatialPoint) -> f64 {
    haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
  }
}

/// Wire representation of a [`SpatialPoint`].
#[derive(Debug, Serialize, Deserialize)]
struct GeoJsonPoint {
  #[serde(rename = "type", default = "point_kind")]
  kind:        String,
  /// `[longitude, latitude]`, GeoJSON axis order.
  coordinates: [f64; 2],
  #[serde(default)]
  name:        String,
}

fn point_kind() -> String { "Point".to_owned() }

impl TryFrom<GeoJsonPoint> for SpatialPoint {
  type Error = Error;

  fn try_from(raw: GeoJsonPoint) -> Result<Self> {
    if raw.kind != "Point" {
      return Err(Error::invalid(format!(
        "unsupported geometry type {:?}",
        raw.kind
      )));
    }
    let [longitude, latitude] = raw.coordinates;
    SpatialPoint::new(latitude, longitude, raw.name)
  }
}

impl From<SpatialPoint> for GeoJsonPoint {
  fn from(p: SpatialPoint) -> Self {
    Self {
      kind:        point_kind(),
      coordinates: [p.longitude, p.latitude],
      name:        p.label,
    }
  }
}

// ─── Distance ────────────────────────────────────────────────────────────────

/// Haversine distance between two coordinates given in degrees, in
/// kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
  let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
  let d_phi = (lat2 - lat1).to_radians();
  let d_lambda = (lon2 - lon1).to_radians();

  let a = (d_phi / 2.0).sin().powi(2)
    + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
  2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

// ─── Bounding boxes ──────────────────────────────────────────────────────────

/// An axis-aligned latitude/longitude rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBox {
  pub min_lat: f64,
  pub max_lat: f64,
  pub min_lon: f64,
  pub max_lon: f64,
}

impl GeoBox {
  pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
    (self.min_lat..=self.max_lat).contains(&latitude)
      && (self.min_lon..=self.max_lon).contains(&longitude)
  }

  fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
    Self {
      min_lat: (min_lat - BOX_PADDING_DEG).max(-90.0),
      max_lat: (max_lat + BOX_PADDING_DEG).min(90.0),
      min_lon: (min_lon - BOX_PADDING_DEG).max(-180.0),
      max_lon: (max_lon + BOX_PADDING_DEG).min(180.0),
    }
  }

  fn full_band(min_lat: f64, max_lat: f64) -> Self {
    Self::new(min_lat, max_lat, -180.0, 180.0)
  }
}

/// The rectangles that together cover every point within `radius_km` of
/// `center`.
///
/// Returns two rectangles when the circle crosses the antimeridian and a
/// full-longitude band when it reaches a pole. The cover is conservative:
/// callers must still apply an exact distance check.
pub fn bounding_boxes(center: &SpatialPoint, radius_km: f64) -> Vec<GeoBox> {
  let angular = radius_km / EARTH_RADIUS_KM;
  if angular >= PI {
    return vec![GeoBox::full_band(-90.0, 90.0)];
  }

  let lat = center.latitude.to_radians();
  let lon = center.longitude.to_radians();
  let (min_lat, max_lat) = (lat - angular, lat + angular);

  if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
    return vec![GeoBox::full_band(min_lat.to_degrees(), max_lat.to_degrees())];
  }

  let ratio = angular.sin() / lat.cos();
  if ratio >= 1.0 {
    return vec![GeoBox::full_band(min_lat.to_degrees(), max_lat.to_degrees())];
  }

  let d_lon = ratio.asin();
  let (min_lat, max_lat) = (min_lat.to_degrees(), max_lat.to_degrees());
  let min_lon = (lon - d_lon).to_degrees();
  let max_lon = (lon + d_lon).to_degrees();

  if min_lon < -180.0 {
    vec![
      GeoBox::new(min_lat, max_lat, min_lon + 360.0, 180.0),
      GeoBox::new(min_lat, max_lat, -180.0, max_lon),
    ]
  } else if max_lon > 180.0 {
    vec![
      GeoBox::new(min_lat, max_lat, min_lon, 180.0),
      GeoBox::new(min_lat, max_lat, -180.0, max_lon - 360.0),
    ]
  } else {
    vec![GeoBox::new(min_lat, max_lat, min_lon, max_lon)]
  }
}
