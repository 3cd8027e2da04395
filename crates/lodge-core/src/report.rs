//! Incident reports filed against a resident's room.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{resident::ResidentWithRoom, user::User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
  pub report_id:    Uuid,
  pub resident_id:  Uuid,
  pub date:         DateTime<Utc>,
  pub reason:       String,
  pub action_taken: Option<String>,
  pub urgent:       bool,
  pub location:     Option<String>,
  pub description:  Option<String>,
  pub created_by:   Uuid,
}

/// Input for creating a report. The target resident may be named by id or
/// by student code; exactly one must be present, resolved before any write.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
  pub resident_id:  Option<Uuid>,
  pub student_code: Option<u32>,
  pub reason:       String,
  pub action_taken: Option<String>,
  #[serde(default)]
  pub urgent:       bool,
  pub location:     Option<String>,
  pub description:  Option<String>,
}

impl NewReport {
  pub fn validate(self) -> crate::Result<Self> {
    if self.reason.trim().is_empty() {
      return Err(crate::Error::Validation("reason is required".into()));
    }
    if self.resident_id.is_none() && self.student_code.is_none() {
      return Err(crate::Error::Validation(
        "either resident_id or student_code is required".into(),
      ));
    }
    Ok(self)
  }
}

/// A report composed with its resident, room, and author snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
  pub report:     Report,
  pub resident:   Option<ResidentWithRoom>,
  pub created_by: Option<User>,
}

impl ReportView {
  /// The floor the report belongs to, via the resident→room join.
  pub fn floor(&self) -> Option<u8> {
    self.resident.as_ref().and_then(|r| r.floor())
  }
}
