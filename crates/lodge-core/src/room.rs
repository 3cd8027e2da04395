//! Rooms — numbering rules, floor capacity, and occupancy.
//!
//! Invariant: `occupied` is always consistent with `current_resident`. The
//! store flips both sides of an assignment in one transaction so no partial
//! state is ever observable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Floors the residence actually has.
pub const FLOORS: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
  pub room_id:          Uuid,
  pub number:           u32,
  pub floor:            u8,
  pub occupied:         bool,
  pub current_resident: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
  pub number: u32,
  pub floor:  u8,
}

/// Maximum number of rooms a floor may hold.
///
/// Floor 1 is the small floor: 8 rooms, 101-108. Floors 2-5 hold 34 rooms
/// each, numbered F01-F34.
pub fn floor_capacity(floor: u8) -> Result<u32> {
  match floor {
    1 => Ok(8),
    2..=5 => Ok(34),
    other => Err(Error::Validation(format!("floor {other} does not exist"))),
  }
}

/// Check that `number` lies in `floor`'s numbering range.
pub fn validate_room_number(number: u32, floor: u8) -> Result<()> {
  let capacity = floor_capacity(floor)?;
  let base = u32::from(floor) * 100;
  let range = (base + 1)..=(base + capacity);
  if range.contains(&number) {
    Ok(())
  } else {
    Err(Error::Validation(format!(
      "room number {number} is outside floor {floor}'s range {}-{}",
      range.start(),
      range.end()
    )))
  }
}

impl Room {
  /// Occupancy flag and resident reference must agree.
  pub fn occupancy_consistent(&self) -> bool {
    self.occupied == self.current_resident.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn floor_one_range() {
    assert!(validate_room_number(101, 1).is_ok());
    assert!(validate_room_number(105, 1).is_ok());
    assert!(validate_room_number(108, 1).is_ok());
    assert!(validate_room_number(109, 1).is_err());
    assert!(validate_room_number(209, 1).is_err());
  }

  #[test]
  fn upper_floor_range() {
    assert!(validate_room_number(201, 2).is_ok());
    assert!(validate_room_number(234, 2).is_ok());
    assert!(validate_room_number(235, 2).is_err());
    assert!(validate_room_number(534, 5).is_ok());
    assert!(validate_room_number(108, 2).is_err());
  }

  #[test]
  fn nonexistent_floor_is_rejected() {
    assert!(floor_capacity(0).is_err());
    assert!(floor_capacity(6).is_err());
    assert_eq!(floor_capacity(1).unwrap(), 8);
    assert_eq!(floor_capacity(3).unwrap(), 34);
  }
}
