//! The `ResidenceStore` trait — the persistence collaborator.
//!
//! Implemented by storage backends (e.g. `lodge-store-sqlite`). Higher
//! layers (the API, the stats engine) depend on this abstraction, not on
//! any concrete backend.
//!
//! Composed reads (`*_with_room`, `*_view`) are read-then-compose joins
//! returning immutable snapshots; the store never hands out aliased
//! references between an entity and its related documents. Mutations that
//! touch two entities together (room assignment and release) are applied
//! as a single logical unit: either both writes land or neither does.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  assembly::{Assembly, NewAssembly},
  measure::{DisciplinaryMeasure, MeasureView, NewMeasure},
  news::{NewNews, News},
  report::{NewReport, Report, ReportView},
  resident::{NewResident, Resident, ResidentWithRoom},
  room::{NewRoom, Room},
  service::{NewService, Service},
  user::{NewUser, User},
};

pub trait ResidenceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Insert a new user. Fails on a duplicate email.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Persist the given user record in full (read-modify-write).
  fn update_user<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if the id did not resolve.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Residents ─────────────────────────────────────────────────────────

  /// Insert a new resident. Fails on a duplicate id number or student code.
  fn insert_resident(
    &self,
    input: NewResident,
  ) -> impl Future<Output = Result<Resident, Self::Error>> + Send + '_;

  fn get_resident(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + '_;

  fn find_resident_by_student_code(
    &self,
    student_code: u32,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + '_;

  fn find_resident_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + '_;

  fn list_residents(
    &self,
  ) -> impl Future<Output = Result<Vec<Resident>, Self::Error>> + Send + '_;

  fn update_resident<'a>(
    &'a self,
    resident: &'a Resident,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a resident and release their room in the same unit of work.
  fn delete_resident(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn resident_with_room(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ResidentWithRoom>, Self::Error>> + Send + '_;

  fn list_residents_with_rooms(
    &self,
  ) -> impl Future<Output = Result<Vec<ResidentWithRoom>, Self::Error>> + Send + '_;

  // ── Rooms ─────────────────────────────────────────────────────────────

  /// Insert a new room. Fails on a duplicate room number.
  fn insert_room(
    &self,
    input: NewRoom,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  fn get_room(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Room>, Self::Error>> + Send + '_;

  /// List rooms, optionally restricted to one floor.
  fn list_rooms(
    &self,
    floor: Option<u8>,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;

  fn count_rooms_on_floor(
    &self,
    floor: u8,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  fn update_room<'a>(
    &'a self,
    room: &'a Room,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_room(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Assign `resident_id` to `room_id`: sets the room occupied with the
  /// resident as current, and points the resident at the room. One
  /// transaction; no partial assignment is ever observable.
  fn assign_resident(
    &self,
    room_id: Uuid,
    resident_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Clear a room's occupancy and its resident's back-reference together.
  fn release_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Re-derive every room's occupancy from the resident back-references.
  /// Returns the number of rooms touched.
  fn sync_occupancy(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  fn insert_report(
    &self,
    input: NewReport,
    resident_id: Uuid,
    created_by: Uuid,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  fn get_report(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Report>, Self::Error>> + Send + '_;

  fn update_report<'a>(
    &'a self,
    report: &'a Report,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_report(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// A report joined with its resident, room, and author snapshots.
  fn report_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReportView>, Self::Error>> + Send + '_;

  fn list_report_views(
    &self,
  ) -> impl Future<Output = Result<Vec<ReportView>, Self::Error>> + Send + '_;

  fn list_reports_for_resident(
    &self,
    resident_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReportView>, Self::Error>> + Send + '_;

  // ── Assemblies ────────────────────────────────────────────────────────

  fn insert_assembly(
    &self,
    input: NewAssembly,
    created_by: Uuid,
  ) -> impl Future<Output = Result<Assembly, Self::Error>> + Send + '_;

  fn get_assembly(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assembly>, Self::Error>> + Send + '_;

  fn list_assemblies(
    &self,
  ) -> impl Future<Output = Result<Vec<Assembly>, Self::Error>> + Send + '_;

  fn update_assembly<'a>(
    &'a self,
    assembly: &'a Assembly,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_assembly(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Disciplinary measures ─────────────────────────────────────────────

  fn insert_measure(
    &self,
    input: NewMeasure,
    resident_id: Uuid,
    created_by: Uuid,
  ) -> impl Future<Output = Result<DisciplinaryMeasure, Self::Error>> + Send + '_;

  fn get_measure(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DisciplinaryMeasure>, Self::Error>> + Send + '_;

  fn measure_view(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<MeasureView>, Self::Error>> + Send + '_;

  fn list_measure_views(
    &self,
  ) -> impl Future<Output = Result<Vec<MeasureView>, Self::Error>> + Send + '_;

  fn list_measures_for_resident(
    &self,
    resident_id: Uuid,
  ) -> impl Future<Output = Result<Vec<MeasureView>, Self::Error>> + Send + '_;

  fn update_measure<'a>(
    &'a self,
    measure: &'a DisciplinaryMeasure,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_measure(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── News ──────────────────────────────────────────────────────────────

  fn insert_news(
    &self,
    input: NewNews,
    created_by: Uuid,
  ) -> impl Future<Output = Result<News, Self::Error>> + Send + '_;

  fn get_news(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<News>, Self::Error>> + Send + '_;

  fn list_news(
    &self,
  ) -> impl Future<Output = Result<Vec<News>, Self::Error>> + Send + '_;

  fn delete_news(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Services ──────────────────────────────────────────────────────────

  fn insert_service(
    &self,
    input: NewService,
  ) -> impl Future<Output = Result<Service, Self::Error>> + Send + '_;

  fn get_service(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Service>, Self::Error>> + Send + '_;

  fn list_services(
    &self,
  ) -> impl Future<Output = Result<Vec<Service>, Self::Error>> + Send + '_;

  fn list_services_for_room(
    &self,
    room_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Service>, Self::Error>> + Send + '_;

  fn update_service<'a>(
    &'a self,
    service: &'a Service,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_service(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
