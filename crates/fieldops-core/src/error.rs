//! Error types for `fieldops-core`.

use std::fmt;

use thiserror::Error;

use crate::personnel::PersonnelId;

/// The key a failed lookup was addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonnelRef {
  Id(PersonnelId),
  GovernmentId(String),
}

impl fmt::Display for PersonnelRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Id(id) => write!(f, "id {id}"),
      Self::GovernmentId(gid) => write!(f, "government id {gid:?}"),
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("personnel not found: {0}")]
  NotFound(PersonnelRef),

  #[error("government id {0:?} is already registered")]
  DuplicateKey(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),
}

impl Error {
  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidArgument(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
