//! Residents — the people living in the building.
//!
//! A resident belongs to exactly one user account and occupies at most one
//! room (via back-reference; the room does not own the resident's
//! lifecycle).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::room::Room;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
  pub resident_id:      Uuid,
  pub full_name:        String,
  /// National id number; unique.
  pub id_number:        String,
  /// University student code; unique.
  pub student_code:     u32,
  pub email:            Option<String>,
  pub academic_program: Option<String>,
  /// Current academic period, e.g. `2025-2`.
  pub period:           Option<String>,
  pub admission_year:   Option<u16>,
  pub phone:            Option<String>,
  pub room_id:          Option<Uuid>,
  /// Owning user account (1:1).
  pub user_id:          Option<Uuid>,
  pub enrolled_at:      DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewResident {
  pub full_name:        String,
  pub id_number:        String,
  pub student_code:     u32,
  pub email:            Option<String>,
  pub academic_program: Option<String>,
  pub period:           Option<String>,
  pub admission_year:   Option<u16>,
  pub phone:            Option<String>,
  pub room_id:          Option<Uuid>,
  pub user_id:          Option<Uuid>,
}

impl NewResident {
  pub fn validate(self) -> crate::Result<Self> {
    if self.full_name.trim().is_empty() {
      return Err(crate::Error::Validation("full name is required".into()));
    }
    if self.id_number.trim().is_empty() {
      return Err(crate::Error::Validation("id number is required".into()));
    }
    if let Some(phone) = &self.phone
      && (!(7..=15).contains(&phone.len())
        || phone.chars().any(|c| !c.is_ascii_digit()))
    {
      return Err(crate::Error::Validation(
        "phone must be 7-15 digits".into(),
      ));
    }
    Ok(self)
  }
}

/// A resident composed with its room snapshot. Built by the store as a
/// read-then-compose join; the two halves never alias stored state.
#[derive(Debug, Clone, Serialize)]
pub struct ResidentWithRoom {
  pub resident: Resident,
  pub room:     Option<Room>,
}

impl ResidentWithRoom {
  pub fn floor(&self) -> Option<u8> {
    self.room.as_ref().map(|r| r.floor)
  }
}
