//! User accounts — the credential-bearing side of a person.
//!
//! A user optionally links to a [`Resident`](crate::resident::Resident)
//! record (1:1). Passwords are stored as argon2 PHC strings; hashing and
//! verification live in the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub full_name:     String,
  /// Always stored lowercase; uniqueness is enforced by the store.
  pub email:         String,
  /// Argon2 PHC string. Never serialised into API responses.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
  /// Required for floor-scoped roles, optional otherwise.
  pub floor:         Option<u8>,
  pub active:        bool,
  pub resident_id:   Option<Uuid>,
  pub created_at:    DateTime<Utc>,
}

/// Input for creating a user. The store assigns id and creation timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub full_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
  pub floor:         Option<u8>,
  pub resident_id:   Option<Uuid>,
}

impl NewUser {
  /// Normalise and sanity-check the input before it reaches the store.
  pub fn validate(mut self) -> crate::Result<Self> {
    self.email = self.email.trim().to_lowercase();
    if self.email.is_empty() || !self.email.contains('@') {
      return Err(crate::Error::Validation("invalid email".into()));
    }
    if self.full_name.trim().is_empty() {
      return Err(crate::Error::Validation("full name is required".into()));
    }
    if self.role.is_floor_scoped() && self.floor.is_none() {
      return Err(crate::Error::Validation(format!(
        "a {} must have an assigned floor",
        self.role.as_str()
      )));
    }
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_user(role: Role, floor: Option<u8>) -> NewUser {
    NewUser {
      full_name:     "Ana Gómez".into(),
      email:         "Ana@Example.com".into(),
      password_hash: "$argon2id$stub".into(),
      role,
      floor,
      resident_id:   None,
    }
  }

  #[test]
  fn email_is_lowercased() {
    let u = new_user(Role::Resident, None).validate().unwrap();
    assert_eq!(u.email, "ana@example.com");
  }

  #[test]
  fn representative_requires_floor() {
    assert!(new_user(Role::Representative, None).validate().is_err());
    assert!(new_user(Role::Representative, Some(2)).validate().is_ok());
    assert!(new_user(Role::FloorAuditor, None).validate().is_err());
  }
}
