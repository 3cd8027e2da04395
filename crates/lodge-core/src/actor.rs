//! Actor — the authenticated principal attached to every request.
//!
//! Built by the API layer from a verified bearer token; the core never
//! inspects credentials itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, role::Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
  pub user_id:     Uuid,
  pub role:        Role,
  /// Present only for floor-scoped roles (and residents living on a floor).
  pub floor:       Option<u8>,
  /// The resident record linked to this account, if any.
  pub resident_id: Option<Uuid>,
}

impl Actor {
  /// The floor a floor-scoped actor is entitled to.
  ///
  /// A floor-scoped role with no floor assignment is a configuration error
  /// on the account, surfaced before any data is touched.
  pub fn scope_floor(&self) -> Result<u8> {
    self.floor.ok_or_else(|| {
      Error::Configuration(format!(
        "{} has no assigned floor",
        self.role.as_str()
      ))
    })
  }

  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
