//! [`SqliteStore`] — the SQLite implementation of [`ResidenceStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use lodge_core::{
  assembly::{Assembly, AssemblyStatus, NewAssembly},
  measure::{DisciplinaryMeasure, MeasureStatus, MeasureView, NewMeasure},
  news::{NewNews, News},
  report::{NewReport, Report, ReportView},
  resident::{NewResident, Resident, ResidentWithRoom},
  room::{NewRoom, Room},
  service::{NewService, Service},
  store::ResidenceStore,
  user::{NewUser, User},
};

use crate::{
  encode::{
    encode_assembly_status, encode_assembly_type, encode_dt,
    encode_measure_status, encode_news_type, encode_opt_uuid, encode_uuid,
    RawAssembly, RawMeasure, RawNews, RawReport, RawResident, RawRoom,
    RawService, RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A residence store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
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

  /// Open an in-memory store — useful for testing.
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

  // ── Row-fetch helpers ─────────────────────────────────────────────────────
  //
  // Every read goes through one of these; the per-entity `Raw*::from_row`
  // function pointers keep the column wiring in encode.rs.

  async fn fetch_by_id<R>(
    &self,
    sql: String,
    id: Uuid,
    from_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Option<R>>
  where
    R: Send + 'static,
  {
    let id_str = encode_uuid(id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(&sql, rusqlite::params![id_str], from_row)
              .optional()?,
          )
        })
        .await?,
    )
  }

  async fn fetch_all<R>(
    &self,
    sql: String,
    from_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map([], from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn fetch_all_by<R>(
    &self,
    sql: String,
    param: String,
    from_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<Vec<R>>
  where
    R: Send + 'static,
  {
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params![param], from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  /// Run a DELETE by primary key; `true` if a row was removed.
  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed > 0)
  }

  // ── View composition ──────────────────────────────────────────────────────

  /// Snapshot every resident joined with its room, keyed by resident id.
  async fn resident_room_map(&self) -> Result<HashMap<Uuid, ResidentWithRoom>> {
    let joined = self.list_residents_with_rooms().await?;
    Ok(
      joined
        .into_iter()
        .map(|r| (r.resident.resident_id, r))
        .collect(),
    )
  }

  async fn compose_report_views(
    &self,
    reports: Vec<Report>,
  ) -> Result<Vec<ReportView>> {
    let residents = self.resident_room_map().await?;
    let users: HashMap<Uuid, User> = self
      .list_users()
      .await?
      .into_iter()
      .map(|u| (u.user_id, u))
      .collect();

    Ok(
      reports
        .into_iter()
        .map(|report| ReportView {
          resident:   residents.get(&report.resident_id).cloned(),
          created_by: users.get(&report.created_by).cloned(),
          report,
        })
        .collect(),
    )
  }

  async fn compose_measure_views(
    &self,
    measures: Vec<DisciplinaryMeasure>,
  ) -> Result<Vec<MeasureView>> {
    let residents = self.resident_room_map().await?;
    Ok(
      measures
        .into_iter()
        .map(|measure| MeasureView {
          resident: residents.get(&measure.resident_id).cloned(),
          measure,
        })
        .collect(),
    )
  }
}

/// Outcome of a two-sided occupancy mutation, reported from inside the
/// transaction closure so the caller can map it to a typed error.
enum OccupancyOutcome {
  Done,
  NoRoom,
  NoResident,
}

// ─── ResidenceStore impl ─────────────────────────────────────────────────────

impl ResidenceStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      full_name:     input.full_name,
      email:         input.email,
      password_hash: input.password_hash,
      role:          input.role,
      floor:         input.floor,
      active:        true,
      resident_id:   input.resident_id,
      created_at:    Utc::now(),
    };

    let id_str       = encode_uuid(user.user_id);
    let full_name    = user.full_name.clone();
    let email        = user.email.clone();
    let hash         = user.password_hash.clone();
    let role_str     = user.role.as_str().to_owned();
    let floor        = user.floor.map(i64::from);
    let resident_str = encode_opt_uuid(user.resident_id);
    let at_str       = encode_dt(user.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO users (
             user_id, full_name, email, password_hash, role,
             floor, active, resident_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8)",
          rusqlite::params![
            id_str,
            full_name,
            email,
            hash,
            role_str,
            floor,
            resident_str,
            at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Duplicate("email"));
    }
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let sql = format!(
      "SELECT {} FROM users WHERE user_id = ?1",
      RawUser::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawUser::from_row).await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", RawUser::COLUMNS);
    let raws = self
      .fetch_all_by(sql, email.to_lowercase(), RawUser::from_row)
      .await?;
    raws.into_iter().next().map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let sql = format!(
      "SELECT {} FROM users ORDER BY created_at DESC",
      RawUser::COLUMNS
    );
    let raws = self.fetch_all(sql, RawUser::from_row).await?;
    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn update_user(&self, user: &User) -> Result<()> {
    let id_str       = encode_uuid(user.user_id);
    let full_name    = user.full_name.clone();
    let email        = user.email.clone();
    let hash         = user.password_hash.clone();
    let role_str     = user.role.as_str().to_owned();
    let floor        = user.floor.map(i64::from);
    let active       = user.active;
    let resident_str = encode_opt_uuid(user.resident_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET
             full_name = ?2, email = ?3, password_hash = ?4, role = ?5,
             floor = ?6, active = ?7, resident_id = ?8
           WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            full_name,
            email,
            hash,
            role_str,
            floor,
            active,
            resident_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM users WHERE user_id = ?1", id)
      .await
  }

  // ── Residents ─────────────────────────────────────────────────────────────

  async fn insert_resident(&self, input: NewResident) -> Result<Resident> {
    let resident = Resident {
      resident_id:      Uuid::new_v4(),
      full_name:        input.full_name,
      id_number:        input.id_number,
      student_code:     input.student_code,
      email:            input.email,
      academic_program: input.academic_program,
      period:           input.period,
      admission_year:   input.admission_year,
      phone:            input.phone,
      room_id:          input.room_id,
      user_id:          input.user_id,
      enrolled_at:      Utc::now(),
    };

    let id_str       = encode_uuid(resident.resident_id);
    let full_name    = resident.full_name.clone();
    let id_number    = resident.id_number.clone();
    let student_code = i64::from(resident.student_code);
    let email        = resident.email.clone();
    let program      = resident.academic_program.clone();
    let period       = resident.period.clone();
    let year         = resident.admission_year.map(i64::from);
    let phone        = resident.phone.clone();
    let room_str     = encode_opt_uuid(resident.room_id);
    let user_str     = encode_opt_uuid(resident.user_id);
    let at_str       = encode_dt(resident.enrolled_at);

    let duplicate: Option<&'static str> = self
      .conn
      .call(move |conn| {
        let id_taken: bool = conn
          .query_row(
            "SELECT 1 FROM residents WHERE id_number = ?1",
            rusqlite::params![id_number],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if id_taken {
          return Ok(Some("id number"));
        }

        let code_taken: bool = conn
          .query_row(
            "SELECT 1 FROM residents WHERE student_code = ?1",
            rusqlite::params![student_code],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if code_taken {
          return Ok(Some("student code"));
        }

        conn.execute(
          "INSERT INTO residents (
             resident_id, full_name, id_number, student_code, email,
             academic_program, period, admission_year, phone,
             room_id, user_id, enrolled_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            full_name,
            id_number,
            student_code,
            email,
            program,
            period,
            year,
            phone,
            room_str,
            user_str,
            at_str,
          ],
        )?;
        Ok(None)
      })
      .await?;

    if let Some(field) = duplicate {
      return Err(Error::Duplicate(field));
    }
    Ok(resident)
  }

  async fn get_resident(&self, id: Uuid) -> Result<Option<Resident>> {
    let sql = format!(
      "SELECT {} FROM residents WHERE resident_id = ?1",
      RawResident::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawResident::from_row).await?;
    raw.map(RawResident::into_resident).transpose()
  }

  async fn find_resident_by_student_code(
    &self,
    student_code: u32,
  ) -> Result<Option<Resident>> {
    let sql = format!(
      "SELECT {} FROM residents WHERE student_code = ?1",
      RawResident::COLUMNS
    );
    let raws = self
      .fetch_all_by(sql, student_code.to_string(), RawResident::from_row)
      .await?;
    raws
      .into_iter()
      .next()
      .map(RawResident::into_resident)
      .transpose()
  }

  async fn find_resident_by_user(&self, user_id: Uuid) -> Result<Option<Resident>> {
    let sql = format!(
      "SELECT {} FROM residents WHERE user_id = ?1",
      RawResident::COLUMNS
    );
    let raw = self.fetch_by_id(sql, user_id, RawResident::from_row).await?;
    raw.map(RawResident::into_resident).transpose()
  }

  async fn list_residents(&self) -> Result<Vec<Resident>> {
    let sql = format!(
      "SELECT {} FROM residents ORDER BY full_name",
      RawResident::COLUMNS
    );
    let raws = self.fetch_all(sql, RawResident::from_row).await?;
    raws.into_iter().map(RawResident::into_resident).collect()
  }

  async fn update_resident(&self, resident: &Resident) -> Result<()> {
    let id_str       = encode_uuid(resident.resident_id);
    let full_name    = resident.full_name.clone();
    let id_number    = resident.id_number.clone();
    let student_code = i64::from(resident.student_code);
    let email        = resident.email.clone();
    let program      = resident.academic_program.clone();
    let period       = resident.period.clone();
    let year         = resident.admission_year.map(i64::from);
    let phone        = resident.phone.clone();
    let room_str     = encode_opt_uuid(resident.room_id);
    let user_str     = encode_opt_uuid(resident.user_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE residents SET
             full_name = ?2, id_number = ?3, student_code = ?4, email = ?5,
             academic_program = ?6, period = ?7, admission_year = ?8,
             phone = ?9, room_id = ?10, user_id = ?11
           WHERE resident_id = ?1",
          rusqlite::params![
            id_str,
            full_name,
            id_number,
            student_code,
            email,
            program,
            period,
            year,
            phone,
            room_str,
            user_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_resident(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM reports WHERE resident_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM measures WHERE resident_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "UPDATE rooms SET occupied = 0, current_resident = NULL
           WHERE current_resident = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "UPDATE users SET resident_id = NULL WHERE resident_id = ?1",
          rusqlite::params![id_str],
        )?;
        let changed = tx.execute(
          "DELETE FROM residents WHERE resident_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(changed > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn resident_with_room(&self, id: Uuid) -> Result<Option<ResidentWithRoom>> {
    let Some(resident) = self.get_resident(id).await? else {
      return Ok(None);
    };
    let room = match resident.room_id {
      Some(room_id) => self.get_room(room_id).await?,
      None => None,
    };
    Ok(Some(ResidentWithRoom { resident, room }))
  }

  async fn list_residents_with_rooms(&self) -> Result<Vec<ResidentWithRoom>> {
    let residents = self.list_residents().await?;
    let rooms: HashMap<Uuid, Room> = self
      .list_rooms(None)
      .await?
      .into_iter()
      .map(|r| (r.room_id, r))
      .collect();

    Ok(
      residents
        .into_iter()
        .map(|resident| {
          let room = resident.room_id.and_then(|id| rooms.get(&id).cloned());
          ResidentWithRoom { resident, room }
        })
        .collect(),
    )
  }

  // ── Rooms ─────────────────────────────────────────────────────────────────

  async fn insert_room(&self, input: NewRoom) -> Result<Room> {
    let room = Room {
      room_id:          Uuid::new_v4(),
      number:           input.number,
      floor:            input.floor,
      occupied:         false,
      current_resident: None,
    };

    let id_str = encode_uuid(room.room_id);
    let number = i64::from(room.number);
    let floor  = i64::from(room.floor);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM rooms WHERE number = ?1",
            rusqlite::params![number],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO rooms (room_id, number, floor, occupied, current_resident)
           VALUES (?1, ?2, ?3, 0, NULL)",
          rusqlite::params![id_str, number, floor],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Duplicate("room number"));
    }
    Ok(room)
  }

  async fn get_room(&self, id: Uuid) -> Result<Option<Room>> {
    let sql = format!("SELECT {} FROM rooms WHERE room_id = ?1", RawRoom::COLUMNS);
    let raw = self.fetch_by_id(sql, id, RawRoom::from_row).await?;
    raw.map(RawRoom::into_room).transpose()
  }

  async fn list_rooms(&self, floor: Option<u8>) -> Result<Vec<Room>> {
    let raws = match floor {
      Some(f) => {
        let sql = format!(
          "SELECT {} FROM rooms WHERE floor = ?1 ORDER BY number",
          RawRoom::COLUMNS
        );
        self
          .fetch_all_by(sql, i64::from(f).to_string(), RawRoom::from_row)
          .await?
      }
      None => {
        let sql = format!("SELECT {} FROM rooms ORDER BY number", RawRoom::COLUMNS);
        self.fetch_all(sql, RawRoom::from_row).await?
      }
    };
    raws.into_iter().map(RawRoom::into_room).collect()
  }

  async fn count_rooms_on_floor(&self, floor: u8) -> Result<u32> {
    let floor = i64::from(floor);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM rooms WHERE floor = ?1",
          rusqlite::params![floor],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u32)
  }

  async fn update_room(&self, room: &Room) -> Result<()> {
    let id_str       = encode_uuid(room.room_id);
    let number       = i64::from(room.number);
    let floor        = i64::from(room.floor);
    let occupied     = room.occupied;
    let resident_str = encode_opt_uuid(room.current_resident);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE rooms SET
             number = ?2, floor = ?3, occupied = ?4, current_resident = ?5
           WHERE room_id = ?1",
          rusqlite::params![id_str, number, floor, occupied, resident_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_room(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM services WHERE room_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "UPDATE residents SET room_id = NULL WHERE room_id = ?1",
          rusqlite::params![id_str],
        )?;
        let changed = tx.execute(
          "DELETE FROM rooms WHERE room_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(changed > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn assign_resident(&self, room_id: Uuid, resident_id: Uuid) -> Result<()> {
    let room_str     = encode_uuid(room_id);
    let resident_str = encode_uuid(resident_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let room_exists: bool = tx
          .query_row(
            "SELECT 1 FROM rooms WHERE room_id = ?1",
            rusqlite::params![room_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !room_exists {
          return Ok(OccupancyOutcome::NoRoom);
        }

        let resident_exists: bool = tx
          .query_row(
            "SELECT 1 FROM residents WHERE resident_id = ?1",
            rusqlite::params![resident_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !resident_exists {
          return Ok(OccupancyOutcome::NoResident);
        }

        // The resident may already live elsewhere; the room may already
        // hold someone. Clear both stale sides before linking.
        tx.execute(
          "UPDATE rooms SET occupied = 0, current_resident = NULL
           WHERE current_resident = ?1 AND room_id != ?2",
          rusqlite::params![resident_str, room_str],
        )?;
        tx.execute(
          "UPDATE residents SET room_id = NULL
           WHERE room_id = ?1 AND resident_id != ?2",
          rusqlite::params![room_str, resident_str],
        )?;

        tx.execute(
          "UPDATE rooms SET occupied = 1, current_resident = ?2
           WHERE room_id = ?1",
          rusqlite::params![room_str, resident_str],
        )?;
        tx.execute(
          "UPDATE residents SET room_id = ?2 WHERE resident_id = ?1",
          rusqlite::params![resident_str, room_str],
        )?;

        tx.commit()?;
        Ok(OccupancyOutcome::Done)
      })
      .await?;

    match outcome {
      OccupancyOutcome::Done => Ok(()),
      OccupancyOutcome::NoRoom => Err(Error::RoomNotFound(room_id)),
      OccupancyOutcome::NoResident => Err(Error::ResidentNotFound(resident_id)),
    }
  }

  async fn release_room(&self, room_id: Uuid) -> Result<()> {
    let room_str = encode_uuid(room_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let room_exists: bool = tx
          .query_row(
            "SELECT 1 FROM rooms WHERE room_id = ?1",
            rusqlite::params![room_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !room_exists {
          return Ok(OccupancyOutcome::NoRoom);
        }

        tx.execute(
          "UPDATE residents SET room_id = NULL WHERE room_id = ?1",
          rusqlite::params![room_str],
        )?;
        tx.execute(
          "UPDATE rooms SET occupied = 0, current_resident = NULL
           WHERE room_id = ?1",
          rusqlite::params![room_str],
        )?;

        tx.commit()?;
        Ok(OccupancyOutcome::Done)
      })
      .await?;

    match outcome {
      OccupancyOutcome::NoRoom => Err(Error::RoomNotFound(room_id)),
      _ => Ok(()),
    }
  }

  async fn sync_occupancy(&self) -> Result<u32> {
    let touched = self
      .conn
      .call(|conn| {
        let changed = conn.execute(
          "UPDATE rooms SET
             current_resident = (
               SELECT r.resident_id FROM residents r
               WHERE r.room_id = rooms.room_id LIMIT 1
             ),
             occupied = EXISTS (
               SELECT 1 FROM residents r WHERE r.room_id = rooms.room_id
             )
           WHERE current_resident IS NOT (
               SELECT r.resident_id FROM residents r
               WHERE r.room_id = rooms.room_id LIMIT 1
             )
             OR occupied != EXISTS (
               SELECT 1 FROM residents r WHERE r.room_id = rooms.room_id
             )",
          [],
        )?;
        Ok(changed)
      })
      .await?;
    Ok(touched as u32)
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn insert_report(
    &self,
    input: NewReport,
    resident_id: Uuid,
    created_by: Uuid,
  ) -> Result<Report> {
    let report = Report {
      report_id: Uuid::new_v4(),
      resident_id,
      date: Utc::now(),
      reason: input.reason,
      action_taken: input.action_taken,
      urgent: input.urgent,
      location: input.location,
      description: input.description,
      created_by,
    };

    let id_str       = encode_uuid(report.report_id);
    let resident_str = encode_uuid(report.resident_id);
    let date_str     = encode_dt(report.date);
    let reason       = report.reason.clone();
    let action       = report.action_taken.clone();
    let urgent       = report.urgent;
    let location     = report.location.clone();
    let description  = report.description.clone();
    let author_str   = encode_uuid(report.created_by);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             report_id, resident_id, date, reason, action_taken,
             urgent, location, description, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            resident_str,
            date_str,
            reason,
            action,
            urgent,
            location,
            description,
            author_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(report)
  }

  async fn get_report(&self, id: Uuid) -> Result<Option<Report>> {
    let sql = format!(
      "SELECT {} FROM reports WHERE report_id = ?1",
      RawReport::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawReport::from_row).await?;
    raw.map(RawReport::into_report).transpose()
  }

  async fn update_report(&self, report: &Report) -> Result<()> {
    let id_str      = encode_uuid(report.report_id);
    let reason      = report.reason.clone();
    let action      = report.action_taken.clone();
    let urgent      = report.urgent;
    let location    = report.location.clone();
    let description = report.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE reports SET
             reason = ?2, action_taken = ?3, urgent = ?4,
             location = ?5, description = ?6
           WHERE report_id = ?1",
          rusqlite::params![id_str, reason, action, urgent, location, description],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_report(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM reports WHERE report_id = ?1", id)
      .await
  }

  async fn report_view(&self, id: Uuid) -> Result<Option<ReportView>> {
    let Some(report) = self.get_report(id).await? else {
      return Ok(None);
    };
    let mut views = self.compose_report_views(vec![report]).await?;
    Ok(views.pop())
  }

  async fn list_report_views(&self) -> Result<Vec<ReportView>> {
    let sql = format!(
      "SELECT {} FROM reports ORDER BY date DESC",
      RawReport::COLUMNS
    );
    let raws = self.fetch_all(sql, RawReport::from_row).await?;
    let reports = raws
      .into_iter()
      .map(RawReport::into_report)
      .collect::<Result<Vec<_>>>()?;
    self.compose_report_views(reports).await
  }

  async fn list_reports_for_resident(
    &self,
    resident_id: Uuid,
  ) -> Result<Vec<ReportView>> {
    let sql = format!(
      "SELECT {} FROM reports WHERE resident_id = ?1 ORDER BY date DESC",
      RawReport::COLUMNS
    );
    let raws = self
      .fetch_all_by(sql, encode_uuid(resident_id), RawReport::from_row)
      .await?;
    let reports = raws
      .into_iter()
      .map(RawReport::into_report)
      .collect::<Result<Vec<_>>>()?;
    self.compose_report_views(reports).await
  }

  // ── Assemblies ────────────────────────────────────────────────────────────

  async fn insert_assembly(
    &self,
    input: NewAssembly,
    created_by: Uuid,
  ) -> Result<Assembly> {
    let assembly = Assembly {
      assembly_id:         Uuid::new_v4(),
      title:               input.title,
      assembly_type:       input.assembly_type,
      date:                input.date,
      time:                input.time,
      location:            input.location,
      description:         input.description,
      attendance:          None,
      status:              AssemblyStatus::Programada,
      postponement_reason: None,
      new_date:            None,
      new_time:            None,
      created_by,
      floor:               input.floor,
      created_at:          Utc::now(),
    };

    let id_str      = encode_uuid(assembly.assembly_id);
    let title       = assembly.title.clone();
    let type_str    = encode_assembly_type(assembly.assembly_type).to_owned();
    let date        = assembly.date.clone();
    let time        = assembly.time.clone();
    let location    = assembly.location.clone();
    let description = assembly.description.clone();
    let status_str  = encode_assembly_status(assembly.status).to_owned();
    let author_str  = encode_uuid(assembly.created_by);
    let floor       = assembly.floor.map(i64::from);
    let at_str      = encode_dt(assembly.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO assemblies (
             assembly_id, title, assembly_type, date, time, location,
             description, status, created_by, floor, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            title,
            type_str,
            date,
            time,
            location,
            description,
            status_str,
            author_str,
            floor,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(assembly)
  }

  async fn get_assembly(&self, id: Uuid) -> Result<Option<Assembly>> {
    let sql = format!(
      "SELECT {} FROM assemblies WHERE assembly_id = ?1",
      RawAssembly::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawAssembly::from_row).await?;
    raw.map(RawAssembly::into_assembly).transpose()
  }

  async fn list_assemblies(&self) -> Result<Vec<Assembly>> {
    let sql = format!(
      "SELECT {} FROM assemblies ORDER BY date DESC, time DESC",
      RawAssembly::COLUMNS
    );
    let raws = self.fetch_all(sql, RawAssembly::from_row).await?;
    raws.into_iter().map(RawAssembly::into_assembly).collect()
  }

  async fn update_assembly(&self, assembly: &Assembly) -> Result<()> {
    let id_str      = encode_uuid(assembly.assembly_id);
    let title       = assembly.title.clone();
    let type_str    = encode_assembly_type(assembly.assembly_type).to_owned();
    let date        = assembly.date.clone();
    let time        = assembly.time.clone();
    let location    = assembly.location.clone();
    let description = assembly.description.clone();
    let present     = assembly.attendance.map(|a| i64::from(a.present));
    let total       = assembly.attendance.map(|a| i64::from(a.total));
    let status_str  = encode_assembly_status(assembly.status).to_owned();
    let reason      = assembly.postponement_reason.clone();
    let new_date    = assembly.new_date.clone();
    let new_time    = assembly.new_time.clone();
    let floor       = assembly.floor.map(i64::from);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE assemblies SET
             title = ?2, assembly_type = ?3, date = ?4, time = ?5,
             location = ?6, description = ?7, attendance_present = ?8,
             attendance_total = ?9, status = ?10, postponement_reason = ?11,
             new_date = ?12, new_time = ?13, floor = ?14
           WHERE assembly_id = ?1",
          rusqlite::params![
            id_str,
            title,
            type_str,
            date,
            time,
            location,
            description,
            present,
            total,
            status_str,
            reason,
            new_date,
            new_time,
            floor,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_assembly(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM assemblies WHERE assembly_id = ?1", id)
      .await
  }

  // ── Disciplinary measures ─────────────────────────────────────────────────

  async fn insert_measure(
    &self,
    input: NewMeasure,
    resident_id: Uuid,
    created_by: Uuid,
  ) -> Result<DisciplinaryMeasure> {
    let measure = DisciplinaryMeasure {
      measure_id: Uuid::new_v4(),
      title: input.title,
      description: input.description,
      status: MeasureStatus::Activa,
      resident_id,
      created_by,
      resolved_by: None,
      created_at: Utc::now(),
    };

    let id_str       = encode_uuid(measure.measure_id);
    let title        = measure.title.clone();
    let description  = measure.description.clone();
    let status_str   = encode_measure_status(measure.status).to_owned();
    let resident_str = encode_uuid(measure.resident_id);
    let author_str   = encode_uuid(measure.created_by);
    let at_str       = encode_dt(measure.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO measures (
             measure_id, title, description, status,
             resident_id, created_by, resolved_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
          rusqlite::params![
            id_str,
            title,
            description,
            status_str,
            resident_str,
            author_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(measure)
  }

  async fn get_measure(&self, id: Uuid) -> Result<Option<DisciplinaryMeasure>> {
    let sql = format!(
      "SELECT {} FROM measures WHERE measure_id = ?1",
      RawMeasure::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawMeasure::from_row).await?;
    raw.map(RawMeasure::into_measure).transpose()
  }

  async fn measure_view(&self, id: Uuid) -> Result<Option<MeasureView>> {
    let Some(measure) = self.get_measure(id).await? else {
      return Ok(None);
    };
    let mut views = self.compose_measure_views(vec![measure]).await?;
    Ok(views.pop())
  }

  async fn list_measure_views(&self) -> Result<Vec<MeasureView>> {
    let sql = format!(
      "SELECT {} FROM measures ORDER BY created_at DESC",
      RawMeasure::COLUMNS
    );
    let raws = self.fetch_all(sql, RawMeasure::from_row).await?;
    let measures = raws
      .into_iter()
      .map(RawMeasure::into_measure)
      .collect::<Result<Vec<_>>>()?;
    self.compose_measure_views(measures).await
  }

  async fn list_measures_for_resident(
    &self,
    resident_id: Uuid,
  ) -> Result<Vec<MeasureView>> {
    let sql = format!(
      "SELECT {} FROM measures WHERE resident_id = ?1 ORDER BY created_at DESC",
      RawMeasure::COLUMNS
    );
    let raws = self
      .fetch_all_by(sql, encode_uuid(resident_id), RawMeasure::from_row)
      .await?;
    let measures = raws
      .into_iter()
      .map(RawMeasure::into_measure)
      .collect::<Result<Vec<_>>>()?;
    self.compose_measure_views(measures).await
  }

  async fn update_measure(&self, measure: &DisciplinaryMeasure) -> Result<()> {
    let id_str       = encode_uuid(measure.measure_id);
    let title        = measure.title.clone();
    let description  = measure.description.clone();
    let status_str   = encode_measure_status(measure.status).to_owned();
    let resolved_str = encode_opt_uuid(measure.resolved_by);

    self
      .conn
      .call(move |conn| {
        // resolved_by is written once; COALESCE keeps the first resolver.
        conn.execute(
          "UPDATE measures SET
             title = ?2, description = ?3, status = ?4,
             resolved_by = COALESCE(resolved_by, ?5)
           WHERE measure_id = ?1",
          rusqlite::params![id_str, title, description, status_str, resolved_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_measure(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM measures WHERE measure_id = ?1", id)
      .await
  }

  // ── News ──────────────────────────────────────────────────────────────────

  async fn insert_news(&self, input: NewNews, created_by: Uuid) -> Result<News> {
    let news = News {
      news_id: Uuid::new_v4(),
      title: input.title,
      content: input.content,
      news_type: input.news_type,
      floor: input.floor,
      published_at: Utc::now(),
      created_by,
    };

    let id_str     = encode_uuid(news.news_id);
    let title      = news.title.clone();
    let content    = news.content.clone();
    let type_str   = encode_news_type(news.news_type).to_owned();
    let floor      = news.floor.map(i64::from);
    let at_str     = encode_dt(news.published_at);
    let author_str = encode_uuid(news.created_by);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO news (
             news_id, title, content, news_type, floor, published_at, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, title, content, type_str, floor, at_str, author_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(news)
  }

  async fn get_news(&self, id: Uuid) -> Result<Option<News>> {
    let sql = format!("SELECT {} FROM news WHERE news_id = ?1", RawNews::COLUMNS);
    let raw = self.fetch_by_id(sql, id, RawNews::from_row).await?;
    raw.map(RawNews::into_news).transpose()
  }

  async fn list_news(&self) -> Result<Vec<News>> {
    let sql = format!(
      "SELECT {} FROM news ORDER BY published_at DESC",
      RawNews::COLUMNS
    );
    let raws = self.fetch_all(sql, RawNews::from_row).await?;
    raws.into_iter().map(RawNews::into_news).collect()
  }

  async fn delete_news(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM news WHERE news_id = ?1", id)
      .await
  }

  // ── Services ──────────────────────────────────────────────────────────────

  async fn insert_service(&self, input: NewService) -> Result<Service> {
    let service = Service {
      service_id:  Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      schedule:    input.schedule,
      room_id:     input.room_id,
    };

    let id_str      = encode_uuid(service.service_id);
    let name        = service.name.clone();
    let description = service.description.clone();
    let schedule    = service.schedule.clone();
    let room_str    = encode_uuid(service.room_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO services (service_id, name, description, schedule, room_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, description, schedule, room_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(service)
  }

  async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
    let sql = format!(
      "SELECT {} FROM services WHERE service_id = ?1",
      RawService::COLUMNS
    );
    let raw = self.fetch_by_id(sql, id, RawService::from_row).await?;
    raw.map(RawService::into_service).transpose()
  }

  async fn list_services(&self) -> Result<Vec<Service>> {
    let sql = format!("SELECT {} FROM services ORDER BY name", RawService::COLUMNS);
    let raws = self.fetch_all(sql, RawService::from_row).await?;
    raws.into_iter().map(RawService::into_service).collect()
  }

  async fn list_services_for_room(&self, room_id: Uuid) -> Result<Vec<Service>> {
    let sql = format!(
      "SELECT {} FROM services WHERE room_id = ?1 ORDER BY name",
      RawService::COLUMNS
    );
    let raws = self
      .fetch_all_by(sql, encode_uuid(room_id), RawService::from_row)
      .await?;
    raws.into_iter().map(RawService::into_service).collect()
  }

  async fn update_service(&self, service: &Service) -> Result<()> {
    let id_str      = encode_uuid(service.service_id);
    let name        = service.name.clone();
    let description = service.description.clone();
    let schedule    = service.schedule.clone();
    let room_str    = encode_uuid(service.room_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE services SET
             name = ?2, description = ?3, schedule = ?4, room_id = ?5
           WHERE service_id = ?1",
          rusqlite::params![id_str, name, description, schedule, room_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_service(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM services WHERE service_id = ?1", id)
      .await
  }
}
