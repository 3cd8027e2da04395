//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Enums are stored as their
//! canonical strings. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use lodge_core::{
  assembly::{Assembly, AssemblyStatus, AssemblyType, Attendance},
  measure::{DisciplinaryMeasure, MeasureStatus},
  news::{News, NewsType},
  report::Report,
  resident::Resident,
  role::Role,
  room::Room,
  service::Service,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Option<String> {
  id.map(encode_uuid)
}

pub fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

pub fn decode_floor(v: Option<i64>) -> Result<Option<u8>> {
  v.map(|f| {
    u8::try_from(f).map_err(|_| Error::Decode(format!("floor out of range: {f}")))
  })
  .transpose()
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

pub fn encode_assembly_type(t: AssemblyType) -> &'static str {
  match t {
    AssemblyType::General => "general",
    AssemblyType::Floor => "floor",
  }
}

pub fn decode_assembly_type(s: &str) -> Result<AssemblyType> {
  match s {
    "general" => Ok(AssemblyType::General),
    "floor" => Ok(AssemblyType::Floor),
    other => Err(Error::Decode(format!("unknown assembly type: {other:?}"))),
  }
}

pub fn encode_assembly_status(s: AssemblyStatus) -> &'static str {
  match s {
    AssemblyStatus::Programada => "Programada",
    AssemblyStatus::Completada => "Completada",
    AssemblyStatus::Aplazada => "Aplazada",
    AssemblyStatus::Cancelada => "Cancelada",
  }
}

pub fn decode_assembly_status(s: &str) -> Result<AssemblyStatus> {
  match s {
    "Programada" => Ok(AssemblyStatus::Programada),
    "Completada" => Ok(AssemblyStatus::Completada),
    "Aplazada" => Ok(AssemblyStatus::Aplazada),
    "Cancelada" => Ok(AssemblyStatus::Cancelada),
    other => Err(Error::Decode(format!("unknown assembly status: {other:?}"))),
  }
}

pub fn encode_measure_status(s: MeasureStatus) -> &'static str {
  match s {
    MeasureStatus::Activa => "Activa",
    MeasureStatus::Resuelta => "Resuelta",
  }
}

pub fn decode_measure_status(s: &str) -> Result<MeasureStatus> {
  match s {
    "Activa" => Ok(MeasureStatus::Activa),
    "Resuelta" => Ok(MeasureStatus::Resuelta),
    other => Err(Error::Decode(format!("unknown measure status: {other:?}"))),
  }
}

pub fn encode_news_type(t: NewsType) -> &'static str {
  match t {
    NewsType::General => "general",
    NewsType::Floor => "floor",
  }
}

pub fn decode_news_type(s: &str) -> Result<NewsType> {
  match s {
    "general" => Ok(NewsType::General),
    "floor" => Ok(NewsType::Floor),
    other => Err(Error::Decode(format!("unknown news type: {other:?}"))),
  }
}

// ─── Row structs ─────────────────────────────────────────────────────────────
//
// Raw column images read inside `conn.call` closures, converted to domain
// types on the async side so decode errors surface as store errors.

pub struct RawUser {
  pub user_id:       String,
  pub full_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub floor:         Option<i64>,
  pub active:        bool,
  pub resident_id:   Option<String>,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str =
    "user_id, full_name, email, password_hash, role, floor, active, resident_id, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawUser {
      user_id:       row.get(0)?,
      full_name:     row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      role:          row.get(4)?,
      floor:         row.get(5)?,
      active:        row.get(6)?,
      resident_id:   row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      full_name:     self.full_name,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      floor:         decode_floor(self.floor)?,
      active:        self.active,
      resident_id:   decode_opt_uuid(self.resident_id)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawResident {
  pub resident_id:      String,
  pub full_name:        String,
  pub id_number:        String,
  pub student_code:     i64,
  pub email:            Option<String>,
  pub academic_program: Option<String>,
  pub period:           Option<String>,
  pub admission_year:   Option<i64>,
  pub phone:            Option<String>,
  pub room_id:          Option<String>,
  pub user_id:          Option<String>,
  pub enrolled_at:      String,
}

impl RawResident {
  pub const COLUMNS: &'static str = "resident_id, full_name, id_number, student_code, email, \
     academic_program, period, admission_year, phone, room_id, user_id, enrolled_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawResident {
      resident_id:      row.get(0)?,
      full_name:        row.get(1)?,
      id_number:        row.get(2)?,
      student_code:     row.get(3)?,
      email:            row.get(4)?,
      academic_program: row.get(5)?,
      period:           row.get(6)?,
      admission_year:   row.get(7)?,
      phone:            row.get(8)?,
      room_id:          row.get(9)?,
      user_id:          row.get(10)?,
      enrolled_at:      row.get(11)?,
    })
  }

  pub fn into_resident(self) -> Result<Resident> {
    Ok(Resident {
      resident_id:      decode_uuid(&self.resident_id)?,
      full_name:        self.full_name,
      id_number:        self.id_number,
      student_code:     u32::try_from(self.student_code)
        .map_err(|_| Error::Decode("student code out of range".into()))?,
      email:            self.email,
      academic_program: self.academic_program,
      period:           self.period,
      admission_year:   self
        .admission_year
        .map(|y| {
          u16::try_from(y)
            .map_err(|_| Error::Decode("admission year out of range".into()))
        })
        .transpose()?,
      phone:            self.phone,
      room_id:          decode_opt_uuid(self.room_id)?,
      user_id:          decode_opt_uuid(self.user_id)?,
      enrolled_at:      decode_dt(&self.enrolled_at)?,
    })
  }
}

pub struct RawRoom {
  pub room_id:          String,
  pub number:           i64,
  pub floor:            i64,
  pub occupied:         bool,
  pub current_resident: Option<String>,
}

impl RawRoom {
  pub const COLUMNS: &'static str =
    "room_id, number, floor, occupied, current_resident";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRoom {
      room_id:          row.get(0)?,
      number:           row.get(1)?,
      floor:            row.get(2)?,
      occupied:         row.get(3)?,
      current_resident: row.get(4)?,
    })
  }

  pub fn into_room(self) -> Result<Room> {
    Ok(Room {
      room_id:          decode_uuid(&self.room_id)?,
      number:           u32::try_from(self.number)
        .map_err(|_| Error::Decode("room number out of range".into()))?,
      floor:            u8::try_from(self.floor)
        .map_err(|_| Error::Decode("floor out of range".into()))?,
      occupied:         self.occupied,
      current_resident: decode_opt_uuid(self.current_resident)?,
    })
  }
}

pub struct RawReport {
  pub report_id:    String,
  pub resident_id:  String,
  pub date:         String,
  pub reason:       String,
  pub action_taken: Option<String>,
  pub urgent:       bool,
  pub location:     Option<String>,
  pub description:  Option<String>,
  pub created_by:   String,
}

impl RawReport {
  pub const COLUMNS: &'static str = "report_id, resident_id, date, reason, action_taken, urgent, \
     location, description, created_by";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawReport {
      report_id:    row.get(0)?,
      resident_id:  row.get(1)?,
      date:         row.get(2)?,
      reason:       row.get(3)?,
      action_taken: row.get(4)?,
      urgent:       row.get(5)?,
      location:     row.get(6)?,
      description:  row.get(7)?,
      created_by:   row.get(8)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:    decode_uuid(&self.report_id)?,
      resident_id:  decode_uuid(&self.resident_id)?,
      date:         decode_dt(&self.date)?,
      reason:       self.reason,
      action_taken: self.action_taken,
      urgent:       self.urgent,
      location:     self.location,
      description:  self.description,
      created_by:   decode_uuid(&self.created_by)?,
    })
  }
}

pub struct RawAssembly {
  pub assembly_id:         String,
  pub title:               String,
  pub assembly_type:       String,
  pub date:                String,
  pub time:                String,
  pub location:            String,
  pub description:         Option<String>,
  pub attendance_present:  Option<i64>,
  pub attendance_total:    Option<i64>,
  pub status:              String,
  pub postponement_reason: Option<String>,
  pub new_date:            Option<String>,
  pub new_time:            Option<String>,
  pub created_by:          String,
  pub floor:               Option<i64>,
  pub created_at:          String,
}

impl RawAssembly {
  pub const COLUMNS: &'static str = "assembly_id, title, assembly_type, date, time, location, description, \
     attendance_present, attendance_total, status, postponement_reason, \
     new_date, new_time, created_by, floor, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawAssembly {
      assembly_id:         row.get(0)?,
      title:               row.get(1)?,
      assembly_type:       row.get(2)?,
      date:                row.get(3)?,
      time:                row.get(4)?,
      location:            row.get(5)?,
      description:         row.get(6)?,
      attendance_present:  row.get(7)?,
      attendance_total:    row.get(8)?,
      status:              row.get(9)?,
      postponement_reason: row.get(10)?,
      new_date:            row.get(11)?,
      new_time:            row.get(12)?,
      created_by:          row.get(13)?,
      floor:               row.get(14)?,
      created_at:          row.get(15)?,
    })
  }

  pub fn into_assembly(self) -> Result<Assembly> {
    let attendance = match (self.attendance_present, self.attendance_total) {
      (Some(present), Some(total)) => Some(Attendance {
        present: present as u32,
        total:   total as u32,
      }),
      _ => None,
    };
    Ok(Assembly {
      assembly_id:         decode_uuid(&self.assembly_id)?,
      title:               self.title,
      assembly_type:       decode_assembly_type(&self.assembly_type)?,
      date:                self.date,
      time:                self.time,
      location:            self.location,
      description:         self.description,
      attendance,
      status:              decode_assembly_status(&self.status)?,
      postponement_reason: self.postponement_reason,
      new_date:            self.new_date,
      new_time:            self.new_time,
      created_by:          decode_uuid(&self.created_by)?,
      floor:               decode_floor(self.floor)?,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawMeasure {
  pub measure_id:  String,
  pub title:       String,
  pub description: String,
  pub status:      String,
  pub resident_id: String,
  pub created_by:  String,
  pub resolved_by: Option<String>,
  pub created_at:  String,
}

impl RawMeasure {
  pub const COLUMNS: &'static str = "measure_id, title, description, status, resident_id, created_by, \
     resolved_by, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawMeasure {
      measure_id:  row.get(0)?,
      title:       row.get(1)?,
      description: row.get(2)?,
      status:      row.get(3)?,
      resident_id: row.get(4)?,
      created_by:  row.get(5)?,
      resolved_by: row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_measure(self) -> Result<DisciplinaryMeasure> {
    Ok(DisciplinaryMeasure {
      measure_id:  decode_uuid(&self.measure_id)?,
      title:       self.title,
      description: self.description,
      status:      decode_measure_status(&self.status)?,
      resident_id: decode_uuid(&self.resident_id)?,
      created_by:  decode_uuid(&self.created_by)?,
      resolved_by: decode_opt_uuid(self.resolved_by)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawNews {
  pub news_id:      String,
  pub title:        String,
  pub content:      String,
  pub news_type:    String,
  pub floor:        Option<i64>,
  pub published_at: String,
  pub created_by:   String,
}

impl RawNews {
  pub const COLUMNS: &'static str =
    "news_id, title, content, news_type, floor, published_at, created_by";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawNews {
      news_id:      row.get(0)?,
      title:        row.get(1)?,
      content:      row.get(2)?,
      news_type:    row.get(3)?,
      floor:        row.get(4)?,
      published_at: row.get(5)?,
      created_by:   row.get(6)?,
    })
  }

  pub fn into_news(self) -> Result<News> {
    Ok(News {
      news_id:      decode_uuid(&self.news_id)?,
      title:        self.title,
      content:      self.content,
      news_type:    decode_news_type(&self.news_type)?,
      floor:        decode_floor(self.floor)?,
      published_at: decode_dt(&self.published_at)?,
      created_by:   decode_uuid(&self.created_by)?,
    })
  }
}

pub struct RawService {
  pub service_id:  String,
  pub name:        String,
  pub description: Option<String>,
  pub schedule:    Option<String>,
  pub room_id:     String,
}

impl RawService {
  pub const COLUMNS: &'static str =
    "service_id, name, description, schedule, room_id";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawService {
      service_id:  row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      schedule:    row.get(3)?,
      room_id:     row.get(4)?,
    })
  }

  pub fn into_service(self) -> Result<Service> {
    Ok(Service {
      service_id:  decode_uuid(&self.service_id)?,
      name:        self.name,
      description: self.description,
      schedule:    self.schedule,
      room_id:     decode_uuid(&self.room_id)?,
    })
  }
}
