//! Assemblies and their status state machine.
//!
//! `Programada → {Completada | Aplazada | Cancelada}`. Completada and
//! Cancelada are terminal; an Aplazada assembly accepts no further status
//! changes either (its other fields stay editable).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyType {
  General,
  Floor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssemblyStatus {
  Programada,
  Completada,
  Aplazada,
  Cancelada,
}

impl AssemblyStatus {
  /// Update of non-status fields is blocked once the assembly has run or
  /// been cancelled.
  pub fn allows_update(self) -> bool {
    !matches!(self, AssemblyStatus::Completada | AssemblyStatus::Cancelada)
  }

  /// A completed assembly is kept as a record and cannot be deleted.
  pub fn allows_delete(self) -> bool {
    self != AssemblyStatus::Completada
  }

  /// Status changes are only valid from the initial state.
  pub fn allows_status_change(self) -> bool {
    self == AssemblyStatus::Programada
  }
}

/// Attendance tally recorded after a general assembly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Attendance {
  pub present: u32,
  pub total:   u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assembly {
  pub assembly_id:         Uuid,
  pub title:               String,
  pub assembly_type:       AssemblyType,
  /// Scheduled date, `YYYY-MM-DD`.
  pub date:                String,
  /// Scheduled time, `HH:MM`.
  pub time:                String,
  pub location:            String,
  pub description:         Option<String>,
  pub attendance:          Option<Attendance>,
  pub status:              AssemblyStatus,
  pub postponement_reason: Option<String>,
  pub new_date:            Option<String>,
  pub new_time:            Option<String>,
  pub created_by:          Uuid,
  /// Set iff `assembly_type` is [`AssemblyType::Floor`].
  pub floor:               Option<u8>,
  pub created_at:          DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAssembly {
  pub title:         String,
  pub assembly_type: AssemblyType,
  pub date:          String,
  pub time:          String,
  pub location:      String,
  pub description:   Option<String>,
  pub floor:         Option<u8>,
}

impl NewAssembly {
  pub fn validate(self) -> Result<Self> {
    if self.title.trim().is_empty() {
      return Err(Error::Validation("title is required".into()));
    }
    match self.assembly_type {
      AssemblyType::Floor if self.floor.is_none() => Err(Error::Validation(
        "a floor assembly requires a floor".into(),
      )),
      AssemblyType::General if self.floor.is_some() => Err(Error::Validation(
        "a general assembly must not carry a floor".into(),
      )),
      _ => Ok(self),
    }
  }
}

/// Requested status change, with the extra fields Aplazada may carry.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
  pub status:              AssemblyStatus,
  pub postponement_reason: Option<String>,
  pub new_date:            Option<String>,
  pub new_time:            Option<String>,
}

impl StatusChange {
  /// Check the target state and its required fields. The role/state gate
  /// lives in the policy layer; this validates the request itself.
  pub fn validate(&self) -> Result<()> {
    match self.status {
      AssemblyStatus::Programada => Err(Error::Validation(
        "cannot change status back to Programada".into(),
      )),
      AssemblyStatus::Aplazada => {
        let reason_ok = self
          .postponement_reason
          .as_deref()
          .is_some_and(|r| !r.trim().is_empty());
        if reason_ok {
          Ok(())
        } else {
          Err(Error::Validation(
            "postponement requires a non-empty reason".into(),
          ))
        }
      }
      AssemblyStatus::Completada | AssemblyStatus::Cancelada => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn terminal_states_block_everything() {
    assert!(AssemblyStatus::Programada.allows_status_change());
    for s in [
      AssemblyStatus::Completada,
      AssemblyStatus::Aplazada,
      AssemblyStatus::Cancelada,
    ] {
      assert!(!s.allows_status_change());
    }
    assert!(!AssemblyStatus::Completada.allows_update());
    assert!(!AssemblyStatus::Cancelada.allows_update());
    assert!(AssemblyStatus::Aplazada.allows_update());
    assert!(!AssemblyStatus::Completada.allows_delete());
    assert!(AssemblyStatus::Cancelada.allows_delete());
  }

  #[test]
  fn postponement_requires_reason() {
    let change = StatusChange {
      status:              AssemblyStatus::Aplazada,
      postponement_reason: None,
      new_date:            Some("2025-02-20".into()),
      new_time:            None,
    };
    assert!(change.validate().is_err());

    let change = StatusChange {
      postponement_reason: Some("quorum not reached".into()),
      ..change
    };
    assert!(change.validate().is_ok());
  }

  #[test]
  fn floor_assembly_requires_floor() {
    let a = NewAssembly {
      title:         "Floor meeting".into(),
      assembly_type: AssemblyType::Floor,
      date:          "2025-01-15".into(),
      time:          "19:00".into(),
      location:      "Floor 2 kitchen".into(),
      description:   None,
      floor:         None,
    };
    assert!(a.validate().is_err());
  }
}
