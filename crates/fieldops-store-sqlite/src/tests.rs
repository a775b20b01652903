//! Integration tests for `SqliteStore` and the core services against an
//! in-memory database.

use std::sync::Arc;

use fieldops_core::{
  Error as CoreError,
  assignment::AssignmentService,
  geo::SpatialPoint,
  lifecycle::is_consistent,
  personnel::{PersonnelDraft, PersonnelId, PersonnelRecord, PersonnelStatus},
  proximity::ProximitySearch,
  store::{PersonnelStore, StoreError},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn point(lat: f64, lon: f64, label: &str) -> SpatialPoint {
  SpatialPoint::new(lat, lon, label).unwrap()
}

fn mumbai() -> SpatialPoint { point(19.0760, 72.8777, "Mumbai HQ") }

fn pune() -> SpatialPoint { point(18.5204, 73.8567, "Pune Office") }

fn draft(government_id: &str, location: SpatialPoint) -> PersonnelDraft {
  PersonnelDraft::new("John Smith", government_id, "9876543210", location)
}

fn is_not_found(e: &Error) -> bool {
  matches!(e.domain(), Some(CoreError::NotFound(_)))
}

fn is_duplicate(e: &Error) -> bool {
  matches!(e.domain(), Some(CoreError::DuplicateKey(_)))
}

fn is_invalid(e: &Error) -> bool {
  matches!(e.domain(), Some(CoreError::InvalidArgument(_)))
}

async fn assert_invariants(s: &SqliteStore) {
  for r in s.list_all().await.unwrap() {
    assert!(
      is_consistent(r.status, r.assigned_location.as_ref()),
      "inconsistent record {r:?}"
    );
  }
  assert!(s.verify_index().await.unwrap());
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_by_id() {
  let s = store().await;

  let input = draft("EMP001", mumbai());
  let created = s.create(input.clone()).await.unwrap();
  assert_eq!(created.name, input.name);
  assert_eq!(created.government_id, input.government_id);
  assert_eq!(created.phone_number, input.phone_number);
  assert_eq!(created.reporting_location, input.reporting_location);
  assert_eq!(created.status, PersonnelStatus::Available);
  assert!(created.assigned_location.is_none());
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_by_id(created.id).await.unwrap();
  assert_eq!(fetched, created);
  assert_invariants(&s).await;
}

#[tokio::test]
async fn get_by_government_id() {
  let s = store().await;
  let created = s.create(draft("EMP002", pune())).await.unwrap();

  let fetched = s.get_by_government_id("EMP002").await.unwrap();
  assert_eq!(fetched.id, created.id);

  let err = s.get_by_government_id("EMP404").await.unwrap_err();
  assert!(is_not_found(&err));

  let err = s.get_by_government_id("  ").await.unwrap_err();
  assert!(is_invalid(&err));
}

#[tokio::test]
async fn get_missing_id_is_not_found() {
  let s = store().await;
  let err = s.get_by_id(PersonnelId::new()).await.unwrap_err();
  assert!(is_not_found(&err));
}

#[tokio::test]
async fn create_rejects_invalid_drafts() {
  let s = store().await;

  let mut blank = draft("EMP001", mumbai());
  blank.name = " ".into();
  assert!(is_invalid(&s.create(blank).await.unwrap_err()));

  let mut pre_assigned = draft("EMP001", mumbai());
  pre_assigned.status = PersonnelStatus::Assigned;
  assert!(is_invalid(&s.create(pre_assigned).await.unwrap_err()));

  assert!(s.list_all().await.unwrap().is_empty());
  assert_invariants(&s).await;
}

#[tokio::test]
async fn duplicate_government_id_is_rejected() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();

  let err = s.create(draft("EMP001", pune())).await.unwrap_err();
  assert!(is_duplicate(&err));

  assert_eq!(s.list_all().await.unwrap().len(), 1);
  assert_invariants(&s).await;
}

#[tokio::test]
async fn concurrent_creates_with_same_government_id() {
  let s = store().await;

  let handles: Vec<_> = (0..8)
    .map(|i| {
      let s = s.clone();
      tokio::spawn(async move {
        let mut d = draft("EMP777", mumbai());
        d.name = format!("Contender {i}");
        s.create(d).await
      })
    })
    .collect();

  let mut ok = 0;
  let mut duplicates = 0;
  for h in handles {
    match h.await.unwrap() {
      Ok(_) => ok += 1,
      Err(e) if is_duplicate(&e) => duplicates += 1,
      Err(e) => panic!("unexpected error: {e}"),
    }
  }
  assert_eq!(ok, 1);
  assert_eq!(duplicates, 7);

  let all = s.list_all().await.unwrap();
  assert_eq!(all.iter().filter(|r| r.government_id == "EMP777").count(), 1);
  assert_invariants(&s).await;
}

#[tokio::test]
async fn list_available_filters_assigned() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  s.create(draft("EMP002", pune())).await.unwrap();
  s.set_assignment("EMP002", point(11.0, 75.5, "Site")).await.unwrap();

  let all = s.list_all().await.unwrap();
  assert_eq!(all.len(), 2);

  let available = s.list_available().await.unwrap();
  assert_eq!(available.len(), 1);
  assert_eq!(available[0].government_id, "EMP001");
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_fields_and_moves_index() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();

  let mut next = draft("EMP001-B", pune());
  next.name = "Sarah Johnson".into();
  next.phone_number = "9876543211".into();
  let updated = s.update(created.id, next).await.unwrap();

  assert_eq!(updated.id, created.id);
  assert_eq!(updated.name, "Sarah Johnson");
  assert_eq!(updated.government_id, "EMP001-B");
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at > created.updated_at);
  assert_eq!(s.get_by_id(created.id).await.unwrap(), updated);

  let near_mumbai = s.find_nearby(mumbai(), 5.0, None).await.unwrap();
  assert!(near_mumbai.is_empty());
  let near_pune = s.find_nearby(pune(), 5.0, None).await.unwrap();
  assert_eq!(near_pune.len(), 1);
  assert_invariants(&s).await;
}

#[tokio::test]
async fn update_keeps_own_government_id() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();

  let mut same = draft("EMP001", mumbai());
  same.phone_number = "1112223333".into();
  let updated = s.update(created.id, same).await.unwrap();
  assert_eq!(updated.phone_number, "1112223333");
}

#[tokio::test]
async fn update_to_taken_government_id_is_duplicate() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  let second = s.create(draft("EMP002", pune())).await.unwrap();

  let err = s.update(second.id, draft("EMP001", pune())).await.unwrap_err();
  assert!(is_duplicate(&err));
  assert_eq!(s.get_by_id(second.id).await.unwrap(), second);
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let s = store().await;
  let err = s
    .update(PersonnelId::new(), draft("EMP001", mumbai()))
    .await
    .unwrap_err();
  assert!(is_not_found(&err));
  assert!(s.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_to_available_clears_assignment() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();
  s.set_assignment("EMP001", point(11.0, 75.5, "Site")).await.unwrap();

  let released = s.update(created.id, draft("EMP001", mumbai())).await.unwrap();
  assert_eq!(released.status, PersonnelStatus::Available);
  assert!(released.assigned_location.is_none());
  assert_invariants(&s).await;
}

#[tokio::test]
async fn update_with_assigned_status_keeps_or_refuses() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();

  let mut stay_assigned = draft("EMP001", mumbai());
  stay_assigned.status = PersonnelStatus::Assigned;

  // Not assigned yet: cannot become assigned through update.
  let err = s.update(created.id, stay_assigned.clone()).await.unwrap_err();
  assert!(is_invalid(&err));

  let site = point(11.0, 75.5, "Site");
  s.set_assignment("EMP001", site.clone()).await.unwrap();
  let kept = s.update(created.id, stay_assigned).await.unwrap();
  assert_eq!(kept.status, PersonnelStatus::Assigned);
  assert_eq!(kept.assigned_location, Some(site));
  assert_invariants(&s).await;
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_from_list_and_index() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();
  s.create(draft("EMP002", pune())).await.unwrap();

  s.delete(created.id).await.unwrap();

  let all = s.list_all().await.unwrap();
  assert_eq!(all.len(), 1);
  assert!(all.iter().all(|r| r.id != created.id));
  assert!(s.find_nearby(mumbai(), 1.0, None).await.unwrap().is_empty());
  assert!(is_not_found(&s.get_by_id(created.id).await.unwrap_err()));
  assert_invariants(&s).await;
}

#[tokio::test]
async fn delete_missing_is_not_found() {
  let s = store().await;
  let err = s.delete(PersonnelId::new()).await.unwrap_err();
  assert!(is_not_found(&err));
}

#[tokio::test]
async fn deleted_government_id_can_be_reused() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();
  s.delete(created.id).await.unwrap();

  let again = s.create(draft("EMP001", pune())).await.unwrap();
  assert_ne!(again.id, created.id);
}

// ─── Spatial queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn find_nearby_applies_radius() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  s.create(draft("EMP002", pune())).await.unwrap();

  let here = s.find_nearby(mumbai(), 1.0, None).await.unwrap();
  assert_eq!(here.len(), 1);
  assert_eq!(here[0].record.government_id, "EMP001");
  assert_eq!(here[0].distance_km, 0.0);

  // Pune is ~120 km away.
  let wide = s.find_nearby(mumbai(), 150.0, None).await.unwrap();
  assert_eq!(wide.len(), 2);
  assert_eq!(wide[0].record.government_id, "EMP001");
  assert!(wide[1].distance_km > 100.0);

  // ~500 km north of Mumbai.
  let far = point(23.57, 72.8777, "far");
  assert!(s.find_nearby(far, 5.0, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn find_nearby_filters_by_status() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  s.set_assignment("EMP001", point(11.0, 75.5, "Site")).await.unwrap();

  let available = s
    .find_nearby(mumbai(), 1.0, Some(PersonnelStatus::Available))
    .await
    .unwrap();
  assert!(available.is_empty());

  let assigned = s
    .find_nearby(mumbai(), 1.0, Some(PersonnelStatus::Assigned))
    .await
    .unwrap();
  assert_eq!(assigned.len(), 1);
}

#[tokio::test]
async fn find_nearby_across_antimeridian() {
  let s = store().await;
  s.create(draft("FJ-EAST", point(-16.5, 179.98, "east"))).await.unwrap();
  s.create(draft("FJ-WEST", point(-16.5, -179.98, "west"))).await.unwrap();

  let found = s
    .find_nearby(point(-16.5, 179.99, "query"), 10.0, None)
    .await
    .unwrap();
  let mut ids: Vec<_> = found.iter().map(|m| m.record.government_id.as_str()).collect();
  ids.sort();
  assert_eq!(ids, ["FJ-EAST", "FJ-WEST"]);
}

#[tokio::test]
async fn find_nearby_excludes_box_corners() {
  let s = store().await;
  // Inside the bounding box of a 10 km circle but ~12.5 km from its centre.
  s.create(draft("CORNER", point(0.08, 0.08, "corner"))).await.unwrap();

  let found = s.find_nearby(point(0.0, 0.0, "o"), 10.0, None).await.unwrap();
  assert!(found.is_empty());
}

// ─── Assignment ──────────────────────────────────────────────────────────────

fn services(
  s: &SqliteStore,
) -> (AssignmentService<SqliteStore>, ProximitySearch<SqliteStore>) {
  let shared = Arc::new(s.clone());
  (
    AssignmentService::new(Arc::clone(&shared)),
    ProximitySearch::new(shared),
  )
}

#[tokio::test]
async fn assign_location_sets_status() {
  let s = store().await;
  let created = s.create(draft("EMP001", mumbai())).await.unwrap();
  let (assignments, _) = services(&s);

  let site = point(11.0, 75.5, "Assigned Location");
  let assigned = assignments.assign_location("EMP001", site.clone()).await.unwrap();

  assert_eq!(assigned.id, created.id);
  assert_eq!(assigned.status, PersonnelStatus::Assigned);
  assert_eq!(assigned.assigned_location, Some(site));
  assert!(assigned.updated_at > created.updated_at);
  assert_eq!(s.get_by_id(created.id).await.unwrap(), assigned);
  assert_invariants(&s).await;
}

#[tokio::test]
async fn reassignment_is_last_write_wins() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  let (assignments, _) = services(&s);

  let first = assignments
    .assign_location("EMP001", point(11.0, 75.5, "first"))
    .await
    .unwrap();
  let second_site = point(12.0, 76.0, "second");
  let second = assignments
    .assign_location("EMP001", second_site.clone())
    .await
    .unwrap();

  assert!(second.updated_at > first.updated_at);
  let stored = s.get_by_government_id("EMP001").await.unwrap();
  assert_eq!(stored.assigned_location, Some(second_site));
  assert_eq!(stored.status, PersonnelStatus::Assigned);
}

#[tokio::test]
async fn assign_unknown_government_id_leaves_store_unchanged() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  let before: Vec<PersonnelRecord> = s.list_all().await.unwrap();
  let (assignments, _) = services(&s);

  let err = assignments
    .assign_location("EMP999", point(11.0, 75.5, "Site"))
    .await
    .unwrap_err();
  assert!(is_not_found(&err));
  assert_eq!(s.list_all().await.unwrap(), before);
}

#[tokio::test]
async fn assign_blank_government_id_is_invalid() {
  let s = store().await;
  let (assignments, _) = services(&s);
  let err = assignments
    .assign_location("", point(11.0, 75.5, "Site"))
    .await
    .unwrap_err();
  assert!(is_invalid(&err));
}

#[tokio::test]
async fn set_assignment_rejects_blank_government_id() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  let before = s.list_all().await.unwrap();

  for blank in ["", "   "] {
    let err = s
      .set_assignment(blank, point(11.0, 75.5, "Site"))
      .await
      .unwrap_err();
    assert!(is_invalid(&err), "{blank:?}: {err}");
  }
  assert_eq!(s.list_all().await.unwrap(), before);
}

#[tokio::test]
async fn concurrent_assignments_serialise() {
  let s = store().await;
  s.create(draft("EMP001", mumbai())).await.unwrap();
  let (assignments, _) = services(&s);

  let sites: Vec<_> = (0..6)
    .map(|i| point(10.0 + i as f64, 75.0, &format!("site {i}")))
    .collect();
  let handles: Vec<_> = sites
    .iter()
    .cloned()
    .map(|site| {
      let assignments = assignments.clone();
      tokio::spawn(async move { assignments.assign_location("EMP001", site).await })
    })
    .collect();

  let mut stamps = Vec::new();
  for h in handles {
    stamps.push(h.await.unwrap().unwrap().updated_at);
  }
  stamps.sort();
  stamps.dedup();
  assert_eq!(stamps.len(), sites.len(), "each write bumps updated_at");

  let stored = s.get_by_government_id("EMP001").await.unwrap();
  assert_eq!(stored.status, PersonnelStatus::Assigned);
  assert!(sites.contains(stored.assigned_location.as_ref().unwrap()));
  assert_eq!(stored.updated_at, *stamps.last().unwrap());
  assert_invariants(&s).await;
}

// ─── Proximity search ────────────────────────────────────────────────────────

#[tokio::test]
async fn proximity_search_returns_available_summaries() {
  let s = store().await;
  let a = s.create(draft("EMP001", mumbai())).await.unwrap();
  s.create(draft("EMP002", point(19.08, 72.88, "Dadar"))).await.unwrap();
  s.create(draft("EMP003", pune())).await.unwrap();
  let (assignments, search) = services(&s);
  assignments
    .assign_location("EMP002", point(11.0, 75.5, "Site"))
    .await
    .unwrap();

  let found = search.find_nearby(mumbai(), Some(1.0)).await.unwrap();
  assert_eq!(found, vec![a.summary()]);

  // Default radius is 5 km: Pune is out of reach.
  let default = search.find_nearby(mumbai(), None).await.unwrap();
  assert_eq!(default.len(), 1);
}

#[tokio::test]
async fn proximity_search_sorts_nearest_first() {
  let s = store().await;
  s.create(draft("FAR", pune())).await.unwrap();
  s.create(draft("NEAR", point(19.08, 72.88, "Dadar"))).await.unwrap();
  let (_, search) = services(&s);

  let found = search.find_nearby(mumbai(), Some(200.0)).await.unwrap();
  let ids: Vec<_> = found.iter().map(|p| p.government_id.as_str()).collect();
  assert_eq!(ids, ["NEAR", "FAR"]);
}

#[tokio::test]
async fn proximity_search_rejects_bad_radius() {
  let s = store().await;
  let (_, search) = services(&s);
  let err = search.find_nearby(mumbai(), Some(0.0)).await.unwrap_err();
  assert!(is_invalid(&err));
}

#[tokio::test]
async fn open_file_store_persists() {
  let dir = std::env::temp_dir().join(format!("fieldops-{}", PersonnelId::new()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("personnel.db");

  let created = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(draft("EMP001", mumbai())).await.unwrap()
  };

  let reopened = SqliteStore::open(&path).await.unwrap();
  assert_eq!(reopened.get_by_id(created.id).await.unwrap(), created);
  assert!(reopened.verify_index().await.unwrap());

  drop(reopened);
  let _ = std::fs::remove_dir_all(&dir);
}
