//! Error type for `fieldops-store-sqlite`.

use fieldops_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure: not found, duplicate government id, invalid input.
  #[error(transparent)]
  Core(#[from] fieldops_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row that no longer decodes into a valid record.
  #[error("corrupt row: {0}")]
  CorruptRow(String),
}

impl StoreError for Error {
  fn domain(&self) -> Option<&fieldops_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
