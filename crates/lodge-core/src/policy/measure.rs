//! Disciplinary-measure policy.
//!
//! Create and resolve belong to the measure-handling set (representative,
//! floor auditor, president, general auditor); the two floor-scoped roles
//! must additionally match the target resident's room floor. Residents
//! never see measures; high roles see them all, floor offices see their
//! floor.

use crate::{actor::Actor, role::Role};

use super::{Action, Decision, DenyReason, EntityRef};

pub(super) fn check(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  match action {
    Action::Create | Action::Update | Action::Delete | Action::ChangeStatus => {
      if !actor.role.handles_measures() {
        return Decision::Deny(DenyReason::RoleNotPermitted);
      }
      if actor.role.is_floor_scoped() {
        floor_match(actor, entity)
      } else {
        Decision::Allow
      }
    }

    Action::Read => {
      if read_allowed(actor, entity) {
        return Decision::Allow;
      }
      if actor.role.is_floor_scoped() {
        floor_match(actor, entity)
      } else {
        Decision::Deny(DenyReason::RoleNotPermitted)
      }
    }
  }
}

pub(super) fn read_allowed(actor: &Actor, entity: &EntityRef) -> bool {
  if actor.role.is_high() {
    return true;
  }
  if actor.role.is_floor_scoped() {
    return actor.floor.is_some() && entity.floor == actor.floor;
  }
  false
}

/// Floor-scoped roles may only touch measures on their own floor. A measure
/// whose resident has no room has no determinable floor and is out of
/// reach for them.
fn floor_match(actor: &Actor, entity: &EntityRef) -> Decision {
  let Some(actor_floor) = actor.floor else {
    return Decision::Deny(DenyReason::MissingFloorAssignment);
  };
  match entity.floor {
    Some(f) if f == actor_floor => Decision::Allow,
    _ => Decision::Deny(DenyReason::WrongFloor),
  }
}
