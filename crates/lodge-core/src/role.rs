//! The closed set of residence roles and their authority classes.
//!
//! The classification is not a linear hierarchy: residents sit below the two
//! floor-scoped offices (representative, floor auditor), which in turn sit
//! below the building-wide "high roles". The registry only ever answers
//! membership questions; it never panics, and unknown role strings fail at
//! deserialisation time rather than defaulting.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Resident,
  Representative,
  FloorAuditor,
  President,
  VicePresident,
  GeneralAuditor,
  Adjudicator,
  SecretaryGeneral,
  Admin,
}

impl Role {
  /// Role assigned at registration when the payload names none. An explicit
  /// policy decision, not a parse fallback: unparseable roles are rejected.
  pub const DEFAULT_REGISTRATION: Role = Role::Resident;

  /// Building-wide authority.
  pub fn is_high(self) -> bool {
    matches!(
      self,
      Role::President
        | Role::VicePresident
        | Role::GeneralAuditor
        | Role::Adjudicator
        | Role::SecretaryGeneral
        | Role::Admin
    )
  }

  /// Authority limited to a single floor. These roles must carry a floor
  /// assignment; its absence is a policy violation, not a silent default.
  pub fn is_floor_scoped(self) -> bool {
    matches!(self, Role::Representative | Role::FloorAuditor)
  }

  /// Roles allowed to create and resolve disciplinary measures.
  pub fn handles_measures(self) -> bool {
    matches!(
      self,
      Role::Representative
        | Role::FloorAuditor
        | Role::President
        | Role::GeneralAuditor
    )
  }

  /// Roles allowed to publish building-wide assemblies and news.
  pub fn publishes_general(self) -> bool {
    matches!(self, Role::Admin | Role::President | Role::SecretaryGeneral)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Role::Resident => "resident",
      Role::Representative => "representative",
      Role::FloorAuditor => "floor_auditor",
      Role::President => "president",
      Role::VicePresident => "vice_president",
      Role::GeneralAuditor => "general_auditor",
      Role::Adjudicator => "adjudicator",
      Role::SecretaryGeneral => "secretary_general",
      Role::Admin => "admin",
    }
  }
}

impl std::str::FromStr for Role {
  type Err = crate::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "resident" => Ok(Role::Resident),
      "representative" => Ok(Role::Representative),
      "floor_auditor" => Ok(Role::FloorAuditor),
      "president" => Ok(Role::President),
      "vice_president" => Ok(Role::VicePresident),
      "general_auditor" => Ok(Role::GeneralAuditor),
      "adjudicator" => Ok(Role::Adjudicator),
      "secretary_general" => Ok(Role::SecretaryGeneral),
      "admin" => Ok(Role::Admin),
      other => Err(crate::Error::Validation(format!("unknown role: {other:?}"))),
    }
  }
}
