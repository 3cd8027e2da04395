//! News policy.
//!
//! General items are published by president/secretary-general (and admin);
//! floor items only by the floor's representative, bound to their own
//! floor. Visibility follows the assembly rule: general ∪ own floor below
//! the high roles. Deletion belongs to the author or the general
//! publishers.

use crate::{actor::Actor, role::Role};

use super::{Action, Decision, DenyReason, EntityRef, floor_mismatch, floor_visible};

pub(super) fn check(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  match action {
    Action::Create => match entity.floor {
      None if actor.role.publishes_general() => Decision::Allow,
      None => Decision::Deny(DenyReason::RoleNotPermitted),
      Some(_) => match actor.role {
        Role::Representative if actor.floor.is_some() => Decision::Allow,
        Role::Representative => {
          Decision::Deny(DenyReason::MissingFloorAssignment)
        }
        _ => Decision::Deny(DenyReason::RoleNotPermitted),
      },
    },

    Action::Read => {
      if read_allowed(actor, entity) {
        Decision::Allow
      } else {
        Decision::Deny(floor_mismatch(actor))
      }
    }

    Action::Delete => {
      if entity.created_by == Some(actor.user_id) || actor.role.publishes_general()
      {
        Decision::Allow
      } else {
        Decision::Deny(DenyReason::NotOwner)
      }
    }

    // News items are replaced, not edited.
    Action::Update | Action::ChangeStatus => {
      Decision::Deny(DenyReason::RoleNotPermitted)
    }
  }
}

pub(super) fn read_allowed(actor: &Actor, entity: &EntityRef) -> bool {
  actor.role.is_high() || floor_visible(actor, entity.floor)
}
