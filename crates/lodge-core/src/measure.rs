//! Disciplinary measures.
//!
//! Status is one-way: `Activa → Resuelta`. The resolver is recorded at most
//! once; a second resolve call never overwrites it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resident::ResidentWithRoom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasureStatus {
  Activa,
  Resuelta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisciplinaryMeasure {
  pub measure_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub status:      MeasureStatus,
  pub resident_id: Uuid,
  pub created_by:  Uuid,
  /// Set exactly once, by the first authorized resolve.
  pub resolved_by: Option<Uuid>,
  pub created_at:  DateTime<Utc>,
}

impl DisciplinaryMeasure {
  /// Apply a resolve: flips status and records the resolver if unset.
  /// Idempotent with respect to `resolved_by`.
  pub fn resolve(&mut self, resolver: Uuid) {
    self.status = MeasureStatus::Resuelta;
    if self.resolved_by.is_none() {
      self.resolved_by = Some(resolver);
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMeasure {
  pub title:        String,
  pub description:  String,
  /// The target resident, looked up by student code before any mutation.
  pub student_code: u32,
}

impl NewMeasure {
  pub fn validate(self) -> crate::Result<Self> {
    if self.title.trim().is_empty() || self.description.trim().is_empty() {
      return Err(crate::Error::Validation(
        "title and description are required".into(),
      ));
    }
    Ok(self)
  }
}

/// A measure composed with its resident (and the resident's room), used for
/// floor scoping and activity feeds.
#[derive(Debug, Clone, Serialize)]
pub struct MeasureView {
  pub measure:  DisciplinaryMeasure,
  pub resident: Option<ResidentWithRoom>,
}

impl MeasureView {
  pub fn floor(&self) -> Option<u8> {
    self.resident.as_ref().and_then(|r| r.floor())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolver_is_recorded_once() {
    let mut m = DisciplinaryMeasure {
      measure_id:  Uuid::new_v4(),
      title:       "Noise".into(),
      description: "Repeated late-night noise".into(),
      status:      MeasureStatus::Activa,
      resident_id: Uuid::new_v4(),
      created_by:  Uuid::new_v4(),
      resolved_by: None,
      created_at:  Utc::now(),
    };

    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    m.resolve(first);
    assert_eq!(m.status, MeasureStatus::Resuelta);
    assert_eq!(m.resolved_by, Some(first));

    m.resolve(second);
    assert_eq!(m.resolved_by, Some(first));
  }
}
