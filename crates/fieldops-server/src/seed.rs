//! Bulk loading of personnel drafts from a JSON file.

use std::path::Path;

use anyhow::Context as _;
use fieldops_core::{
  Error,
  personnel::PersonnelDraft,
  store::{PersonnelStore, StoreError},
};

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub created: usize,
  pub skipped: usize,
}

/// Parse a JSON array of drafts.
pub fn read_drafts(path: &Path) -> anyhow::Result<Vec<PersonnelDraft>> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read seed file {path:?}"))?;
  serde_json::from_str(&raw).with_context(|| format!("malformed seed file {path:?}"))
}

/// Create each draft, skipping government ids that already exist.
pub async fn load<S: PersonnelStore>(
  store: &S,
  drafts: Vec<PersonnelDraft>,
) -> Result<SeedReport, S::Error> {
  let mut report = SeedReport::default();
  for draft in drafts {
    let government_id = draft.government_id.clone();
    match store.create(draft).await {
      Ok(record) => {
        tracing::info!(personnel_id = %record.id, %government_id, "seeded");
        report.created += 1;
      }
      Err(e) if matches!(e.domain(), Some(Error::DuplicateKey(_))) => {
        tracing::debug!(%government_id, "already present, skipping");
        report.skipped += 1;
      }
      Err(e) => return Err(e),
    }
  }
  Ok(report)
}
