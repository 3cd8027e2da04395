//! Room services (cleaning, maintenance, amenities) attached to a room.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
  pub service_id:  Uuid,
  pub name:        String,
  pub description: Option<String>,
  /// Free-form schedule description, e.g. `mondays 08:00-10:00`.
  pub schedule:    Option<String>,
  pub room_id:     Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewService {
  pub name:        String,
  pub description: Option<String>,
  pub schedule:    Option<String>,
  pub room_id:     Uuid,
}

impl NewService {
  pub fn validate(self) -> crate::Result<Self> {
    if self.name.trim().is_empty() {
      return Err(crate::Error::Validation("name is required".into()));
    }
    Ok(self)
  }
}
