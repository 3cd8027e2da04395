//! Integration tests for `SqliteStore` against an in-memory database.

use lodge_core::{
  actor::Actor,
  assembly::{AssemblyStatus, AssemblyType, Attendance, NewAssembly},
  measure::NewMeasure,
  news::{NewNews, NewsType},
  report::NewReport,
  resident::NewResident,
  role::Role,
  room::NewRoom,
  service::NewService,
  stats,
  store::ResidenceStore,
  user::NewUser,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn user_input(email: &str, role: Role, floor: Option<u8>) -> NewUser {
  NewUser {
    full_name: "Ana Gómez".into(),
    email: email.into(),
    password_hash: "$argon2id$stub".into(),
    role,
    floor,
    resident_id: None,
  }
}

fn resident_input(student_code: u32, id_number: &str) -> NewResident {
  NewResident {
    full_name: format!("Resident {student_code}"),
    id_number: id_number.into(),
    student_code,
    email: None,
    academic_program: Some("Engineering".into()),
    period: Some("2025-2".into()),
    admission_year: Some(2023),
    phone: None,
    room_id: None,
    user_id: None,
  }
}

fn report_input() -> NewReport {
  NewReport {
    resident_id: None,
    student_code: None,
    reason: "Unauthorized appliance".into(),
    action_taken: Some("Verbal warning".into()),
    urgent: false,
    location: Some("Room".into()),
    description: None,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_user() {
  let s = store().await;

  let user = s
    .insert_user(user_input("ana@example.com", Role::Resident, None))
    .await
    .unwrap();
  assert!(user.active);

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "ana@example.com");
  assert_eq!(fetched.role, Role::Resident);
  assert_eq!(fetched.password_hash, "$argon2id$stub");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;

  s.insert_user(user_input("ana@example.com", Role::Resident, None))
    .await
    .unwrap();
  let err = s
    .insert_user(user_input("ana@example.com", Role::Admin, None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate("email")));
}

#[tokio::test]
async fn find_user_by_email_ignores_case() {
  let s = store().await;
  s.insert_user(user_input("ana@example.com", Role::Resident, None))
    .await
    .unwrap();

  let found = s.find_user_by_email("ANA@Example.COM").await.unwrap();
  assert!(found.is_some());
  assert!(s.find_user_by_email("bob@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_user() {
  let s = store().await;
  let mut user = s
    .insert_user(user_input("ana@example.com", Role::Resident, None))
    .await
    .unwrap();

  user.role = Role::Representative;
  user.floor = Some(3);
  user.active = false;
  s.update_user(&user).await.unwrap();

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.role, Role::Representative);
  assert_eq!(fetched.floor, Some(3));
  assert!(!fetched.active);

  assert!(s.delete_user(user.user_id).await.unwrap());
  assert!(!s.delete_user(user.user_id).await.unwrap());
  assert!(s.get_user(user.user_id).await.unwrap().is_none());
}

// ─── Residents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_resident_and_find_by_student_code() {
  let s = store().await;
  let resident = s
    .insert_resident(resident_input(20201234, "cc-1"))
    .await
    .unwrap();

  let found = s
    .find_resident_by_student_code(20201234)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.resident_id, resident.resident_id);
  assert!(s.find_resident_by_student_code(999).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_student_code_and_id_number_are_rejected() {
  let s = store().await;
  s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();

  let err = s
    .insert_resident(resident_input(1001, "cc-2"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate("student code")));

  let err = s
    .insert_resident(resident_input(1002, "cc-1"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate("id number")));
}

#[tokio::test]
async fn find_resident_by_user() {
  let s = store().await;
  let user = s
    .insert_user(user_input("ana@example.com", Role::Resident, None))
    .await
    .unwrap();

  let mut input = resident_input(1001, "cc-1");
  input.user_id = Some(user.user_id);
  let resident = s.insert_resident(input).await.unwrap();

  let found = s.find_resident_by_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(found.resident_id, resident.resident_id);
  assert!(s.find_resident_by_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_resident_releases_their_room() {
  let s = store().await;
  let room = s
    .insert_room(NewRoom { number: 201, floor: 2 })
    .await
    .unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  assert!(s.delete_resident(resident.resident_id).await.unwrap());

  let room = s.get_room(room.room_id).await.unwrap().unwrap();
  assert!(!room.occupied);
  assert!(room.current_resident.is_none());
}

// ─── Rooms and occupancy ─────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_room_number_is_rejected() {
  let s = store().await;
  s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let err = s
    .insert_room(NewRoom { number: 201, floor: 2 })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Duplicate("room number")));
}

#[tokio::test]
async fn assign_links_both_sides() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();

  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  let room = s.get_room(room.room_id).await.unwrap().unwrap();
  assert!(room.occupied);
  assert_eq!(room.current_resident, Some(resident.resident_id));
  assert!(room.occupancy_consistent());

  let resident = s.get_resident(resident.resident_id).await.unwrap().unwrap();
  assert_eq!(resident.room_id, Some(room.room_id));
}

#[tokio::test]
async fn reassign_frees_the_previous_room() {
  let s = store().await;
  let first = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let second = s.insert_room(NewRoom { number: 202, floor: 2 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();

  s.assign_resident(first.room_id, resident.resident_id)
    .await
    .unwrap();
  s.assign_resident(second.room_id, resident.resident_id)
    .await
    .unwrap();

  let first = s.get_room(first.room_id).await.unwrap().unwrap();
  assert!(!first.occupied);
  assert!(first.current_resident.is_none());

  let second = s.get_room(second.room_id).await.unwrap().unwrap();
  assert_eq!(second.current_resident, Some(resident.resident_id));
}

#[tokio::test]
async fn assign_evicts_the_previous_occupant_link() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let old = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  let new = s.insert_resident(resident_input(1002, "cc-2")).await.unwrap();

  s.assign_resident(room.room_id, old.resident_id).await.unwrap();
  s.assign_resident(room.room_id, new.resident_id).await.unwrap();

  let old = s.get_resident(old.resident_id).await.unwrap().unwrap();
  assert!(old.room_id.is_none());
  let room = s.get_room(room.room_id).await.unwrap().unwrap();
  assert_eq!(room.current_resident, Some(new.resident_id));
}

#[tokio::test]
async fn assign_to_missing_room_fails() {
  let s = store().await;
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();

  let missing = Uuid::new_v4();
  let err = s
    .assign_resident(missing, resident.resident_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(id) if id == missing));

  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let ghost = Uuid::new_v4();
  let err = s.assign_resident(room.room_id, ghost).await.unwrap_err();
  assert!(matches!(err, Error::ResidentNotFound(id) if id == ghost));
}

#[tokio::test]
async fn release_room_clears_both_sides() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  s.release_room(room.room_id).await.unwrap();

  let room = s.get_room(room.room_id).await.unwrap().unwrap();
  assert!(!room.occupied);
  assert!(room.current_resident.is_none());
  let resident = s.get_resident(resident.resident_id).await.unwrap().unwrap();
  assert!(resident.room_id.is_none());
}

#[tokio::test]
async fn sync_occupancy_repairs_drift() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  // Corrupt the room side of the link.
  let mut broken = s.get_room(room.room_id).await.unwrap().unwrap();
  broken.occupied = false;
  broken.current_resident = None;
  s.update_room(&broken).await.unwrap();

  let touched = s.sync_occupancy().await.unwrap();
  assert_eq!(touched, 1);

  let room = s.get_room(room.room_id).await.unwrap().unwrap();
  assert!(room.occupied);
  assert_eq!(room.current_resident, Some(resident.resident_id));

  // A second pass is a no-op.
  assert_eq!(s.sync_occupancy().await.unwrap(), 0);
}

#[tokio::test]
async fn list_rooms_filters_by_floor() {
  let s = store().await;
  s.insert_room(NewRoom { number: 101, floor: 1 }).await.unwrap();
  s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  s.insert_room(NewRoom { number: 202, floor: 2 }).await.unwrap();

  assert_eq!(s.list_rooms(None).await.unwrap().len(), 3);
  let second = s.list_rooms(Some(2)).await.unwrap();
  assert_eq!(second.len(), 2);
  assert!(second.iter().all(|r| r.floor == 2));
  assert_eq!(s.count_rooms_on_floor(2).await.unwrap(), 2);
  assert_eq!(s.count_rooms_on_floor(5).await.unwrap(), 0);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_view_composes_resident_room_and_author() {
  let s = store().await;
  let author = s
    .insert_user(user_input("rep@example.com", Role::Representative, Some(2)))
    .await
    .unwrap();
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  let report = s
    .insert_report(report_input(), resident.resident_id, author.user_id)
    .await
    .unwrap();

  let view = s.report_view(report.report_id).await.unwrap().unwrap();
  assert_eq!(view.report.reason, "Unauthorized appliance");
  assert_eq!(view.floor(), Some(2));
  assert_eq!(
    view.created_by.as_ref().map(|u| u.user_id),
    Some(author.user_id)
  );
}

#[tokio::test]
async fn reports_filter_by_resident() {
  let s = store().await;
  let author = s
    .insert_user(user_input("rep@example.com", Role::Representative, Some(2)))
    .await
    .unwrap();
  let a = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  let b = s.insert_resident(resident_input(1002, "cc-2")).await.unwrap();

  s.insert_report(report_input(), a.resident_id, author.user_id)
    .await
    .unwrap();
  s.insert_report(report_input(), a.resident_id, author.user_id)
    .await
    .unwrap();
  s.insert_report(report_input(), b.resident_id, author.user_id)
    .await
    .unwrap();

  assert_eq!(s.list_report_views().await.unwrap().len(), 3);
  let for_a = s.list_reports_for_resident(a.resident_id).await.unwrap();
  assert_eq!(for_a.len(), 2);
  assert!(for_a.iter().all(|v| v.report.resident_id == a.resident_id));
}

#[tokio::test]
async fn update_and_delete_report() {
  let s = store().await;
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  let mut report = s
    .insert_report(report_input(), resident.resident_id, Uuid::new_v4())
    .await
    .unwrap();

  report.urgent = true;
  report.action_taken = Some("Escalated".into());
  s.update_report(&report).await.unwrap();

  let fetched = s.get_report(report.report_id).await.unwrap().unwrap();
  assert!(fetched.urgent);
  assert_eq!(fetched.action_taken.as_deref(), Some("Escalated"));

  assert!(s.delete_report(report.report_id).await.unwrap());
  assert!(s.get_report(report.report_id).await.unwrap().is_none());
}

// ─── Assemblies ──────────────────────────────────────────────────────────────

fn assembly_input(assembly_type: AssemblyType, floor: Option<u8>) -> NewAssembly {
  NewAssembly {
    title: "Quarterly assembly".into(),
    assembly_type,
    date: "2025-03-10".into(),
    time: "19:00".into(),
    location: "Common hall".into(),
    description: None,
    floor,
  }
}

#[tokio::test]
async fn new_assembly_starts_scheduled() {
  let s = store().await;
  let assembly = s
    .insert_assembly(assembly_input(AssemblyType::General, None), Uuid::new_v4())
    .await
    .unwrap();
  assert_eq!(assembly.status, AssemblyStatus::Programada);
  assert!(assembly.attendance.is_none());

  let fetched = s.get_assembly(assembly.assembly_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssemblyStatus::Programada);
  assert_eq!(fetched.assembly_type, AssemblyType::General);
}

#[tokio::test]
async fn assembly_status_and_attendance_round_trip() {
  let s = store().await;
  let mut assembly = s
    .insert_assembly(assembly_input(AssemblyType::Floor, Some(3)), Uuid::new_v4())
    .await
    .unwrap();

  assembly.status = AssemblyStatus::Completada;
  assembly.attendance = Some(Attendance { present: 28, total: 34 });
  s.update_assembly(&assembly).await.unwrap();

  let fetched = s.get_assembly(assembly.assembly_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssemblyStatus::Completada);
  assert_eq!(fetched.floor, Some(3));
  let attendance = fetched.attendance.unwrap();
  assert_eq!((attendance.present, attendance.total), (28, 34));
}

#[tokio::test]
async fn postponement_fields_round_trip() {
  let s = store().await;
  let mut assembly = s
    .insert_assembly(assembly_input(AssemblyType::General, None), Uuid::new_v4())
    .await
    .unwrap();

  assembly.status = AssemblyStatus::Aplazada;
  assembly.postponement_reason = Some("quorum not reached".into());
  assembly.new_date = Some("2025-03-17".into());
  assembly.new_time = Some("20:00".into());
  s.update_assembly(&assembly).await.unwrap();

  let fetched = s.get_assembly(assembly.assembly_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AssemblyStatus::Aplazada);
  assert_eq!(
    fetched.postponement_reason.as_deref(),
    Some("quorum not reached")
  );
  assert_eq!(fetched.new_date.as_deref(), Some("2025-03-17"));
}

// ─── Disciplinary measures ───────────────────────────────────────────────────

#[tokio::test]
async fn measure_resolver_survives_later_updates() {
  let s = store().await;
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  let mut measure = s
    .insert_measure(
      NewMeasure {
        title:        "Noise".into(),
        description:  "Late-night noise".into(),
        student_code: 1001,
      },
      resident.resident_id,
      Uuid::new_v4(),
    )
    .await
    .unwrap();

  let first = Uuid::new_v4();
  measure.resolve(first);
  s.update_measure(&measure).await.unwrap();

  // Even a bogus in-memory overwrite cannot displace the stored resolver.
  measure.resolved_by = Some(Uuid::new_v4());
  s.update_measure(&measure).await.unwrap();

  let fetched = s.get_measure(measure.measure_id).await.unwrap().unwrap();
  assert_eq!(fetched.resolved_by, Some(first));
}

#[tokio::test]
async fn measure_views_carry_the_floor() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 301, floor: 3 }).await.unwrap();
  let resident = s.insert_resident(resident_input(1001, "cc-1")).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  s.insert_measure(
    NewMeasure {
      title:        "Noise".into(),
      description:  "Late-night noise".into(),
      student_code: 1001,
    },
    resident.resident_id,
    Uuid::new_v4(),
  )
  .await
  .unwrap();

  let views = s.list_measures_for_resident(resident.resident_id).await.unwrap();
  assert_eq!(views.len(), 1);
  assert_eq!(views[0].floor(), Some(3));
}

// ─── News and services ───────────────────────────────────────────────────────

#[tokio::test]
async fn news_round_trip() {
  let s = store().await;
  let item = s
    .insert_news(
      NewNews {
        title:     "Water outage".into(),
        content:   "Maintenance on Tuesday".into(),
        news_type: NewsType::Floor,
        floor:     Some(4),
      },
      Uuid::new_v4(),
    )
    .await
    .unwrap();

  let fetched = s.get_news(item.news_id).await.unwrap().unwrap();
  assert_eq!(fetched.news_type, NewsType::Floor);
  assert_eq!(fetched.floor, Some(4));

  assert_eq!(s.list_news().await.unwrap().len(), 1);
  assert!(s.delete_news(item.news_id).await.unwrap());
  assert!(s.list_news().await.unwrap().is_empty());
}

#[tokio::test]
async fn services_follow_their_room() {
  let s = store().await;
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  let other = s.insert_room(NewRoom { number: 202, floor: 2 }).await.unwrap();

  s.insert_service(NewService {
    name:        "Cleaning".into(),
    description: None,
    schedule:    Some("mondays 08:00-10:00".into()),
    room_id:     room.room_id,
  })
  .await
  .unwrap();
  s.insert_service(NewService {
    name:        "Laundry".into(),
    description: None,
    schedule:    None,
    room_id:     other.room_id,
  })
  .await
  .unwrap();

  let for_room = s.list_services_for_room(room.room_id).await.unwrap();
  assert_eq!(for_room.len(), 1);
  assert_eq!(for_room[0].name, "Cleaning");

  // Deleting the room removes its services too.
  assert!(s.delete_room(room.room_id).await.unwrap());
  assert!(s.list_services_for_room(room.room_id).await.unwrap().is_empty());
  assert_eq!(s.list_services().await.unwrap().len(), 1);
}

// ─── Stats over the store ────────────────────────────────────────────────────

async fn seed_building(s: &SqliteStore) {
  // Floor 2: two rooms, one occupied. Floor 3: one occupied room.
  let r201 = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  s.insert_room(NewRoom { number: 202, floor: 2 }).await.unwrap();
  let r301 = s.insert_room(NewRoom { number: 301, floor: 3 }).await.unwrap();

  let u1 = s
    .insert_user(user_input("one@example.com", Role::Resident, None))
    .await
    .unwrap();
  let mut input = resident_input(1001, "cc-1");
  input.user_id = Some(u1.user_id);
  let a = s.insert_resident(input).await.unwrap();

  let b = s.insert_resident(resident_input(1002, "cc-2")).await.unwrap();

  s.assign_resident(r201.room_id, a.resident_id).await.unwrap();
  s.assign_resident(r301.room_id, b.resident_id).await.unwrap();

  s.insert_report(report_input(), a.resident_id, Uuid::new_v4())
    .await
    .unwrap();
}

#[tokio::test]
async fn building_wide_stats_are_consistent() {
  let s = store().await;
  seed_building(&s).await;

  let admin = Actor {
    user_id:     Uuid::new_v4(),
    role:        Role::Admin,
    floor:       None,
    resident_id: None,
  };
  let snapshot = stats::compute_stats(&s, &admin).await.unwrap();

  assert_eq!(snapshot.total_rooms, 3);
  assert_eq!(snapshot.occupied_rooms, 2);
  assert_eq!(
    snapshot.occupied_rooms + snapshot.free_rooms,
    snapshot.total_rooms
  );
  assert_eq!(snapshot.total_residents, 2);
  assert_eq!(snapshot.active_residents, 1);
  assert_eq!(snapshot.reports_count, 1);
  assert_eq!(snapshot.floors.len(), 2);
  assert!(snapshot.recent_activities.len() <= stats::RECENT_FEED_CAP);
}

#[tokio::test]
async fn representative_stats_are_floor_scoped() {
  let s = store().await;
  seed_building(&s).await;

  let rep = Actor {
    user_id:     Uuid::new_v4(),
    role:        Role::Representative,
    floor:       Some(2),
    resident_id: None,
  };
  let snapshot = stats::compute_stats(&s, &rep).await.unwrap();

  assert_eq!(snapshot.total_rooms, 2);
  assert_eq!(snapshot.occupied_rooms, 1);
  assert_eq!(snapshot.total_residents, 1);
  assert_eq!(snapshot.reports_count, 1);
  // Per-floor buckets are a building-wide feature.
  assert!(snapshot.floors.is_empty());
}

#[tokio::test]
async fn resident_stats_are_a_degenerate_snapshot() {
  let s = store().await;

  let user = s
    .insert_user(user_input("one@example.com", Role::Resident, None))
    .await
    .unwrap();
  let mut input = resident_input(1001, "cc-1");
  input.user_id = Some(user.user_id);
  let resident = s.insert_resident(input).await.unwrap();
  let room = s.insert_room(NewRoom { number: 201, floor: 2 }).await.unwrap();
  s.assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  let actor = Actor {
    user_id:     user.user_id,
    role:        Role::Resident,
    floor:       None,
    resident_id: Some(resident.resident_id),
  };
  let snapshot = stats::compute_stats(&s, &actor).await.unwrap();

  assert_eq!(snapshot.total_residents, 1);
  assert_eq!(snapshot.active_residents, 1);
  assert_eq!(snapshot.total_rooms, 1);
  assert_eq!(snapshot.occupied_rooms, 1);
  assert_eq!(snapshot.free_rooms, 0);
  assert!(snapshot.recent_activities.is_empty());
}
