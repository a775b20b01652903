//! HTTP server for the fieldops personnel registry.
//!
//! Wraps [`fieldops_api::api_router`] with CORS, request tracing, a health
//! probe and the reverse-geocoding pass-through.

pub mod geocode;
pub mod seed;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use axum::{
  Json, Router,
  http::{HeaderValue, Method},
  routing::get,
};
use fieldops_core::store::PersonnelStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

use geocode::Geocoder;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FIELDOPS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  #[serde(default = "default_cors_origins")]
  pub cors_origins: Vec<String>,
  #[serde(default = "default_geocoder_url")]
  pub geocoder_url: String,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("fieldops.db") }
fn default_cors_origins() -> Vec<String> { vec!["http://localhost:5173".into()] }
fn default_geocoder_url() -> String {
  "https://geocoding-api.open-meteo.com/v1/reverse".into()
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `FIELDOPS_*` variables.
  ///
  /// `FIELDOPS_CORS_ORIGINS` takes a comma-separated list.
  pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(
        config::Environment::with_prefix("FIELDOPS")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> anyhow::Result<Router>
where
  S: PersonnelStore + 'static,
{
  let geocoder = Arc::new(Geocoder::new(config.geocoder_url.clone())?);

  let extras = Router::new()
    .route("/health", get(health))
    .route("/reverse-geocode", get(geocode::handler))
    .with_state(geocoder);

  Ok(
    Router::new()
      .merge(fieldops_api::api_router(store))
      .merge(extras)
      .layer(cors_layer(&config.cors_origins)?)
      .layer(TraceLayer::new_for_http()),
  )
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// CORS for the configured origins; `"*"` allows any origin.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
  let cors = CorsLayer::new()
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers(Any)
    .max_age(Duration::from_secs(3600));

  if origins.iter().any(|o| o == "*") {
    return Ok(cors.allow_origin(Any));
  }

  let origins = origins
    .iter()
    .map(|o| {
      o.parse::<HeaderValue>()
        .with_context(|| format!("invalid CORS origin {o:?}"))
    })
    .collect::<anyhow::Result<Vec<_>>>()?;
  Ok(cors.allow_origin(AllowOrigin::list(origins)))
}
