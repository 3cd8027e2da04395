//! Report policy.
//!
//! Creation is a representative/president privilege. Reads: residents see
//! their own reports, representatives see their floor (through the
//! resident→room→floor join the caller resolved into the descriptor), and
//! only admin sees everything. Updates stay with the author; deletion also
//! admits any representative of the resident's floor.

use crate::{actor::Actor, role::Role};

use super::{Action, Decision, DenyReason, EntityRef, floor_mismatch, owns_resident};

pub(super) fn check(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  match action {
    Action::Create => match actor.role {
      Role::Representative | Role::President => Decision::Allow,
      _ => Decision::Deny(DenyReason::RoleNotPermitted),
    },

    Action::Read => {
      if read_allowed(actor, entity) {
        return Decision::Allow;
      }
      match actor.role {
        Role::Resident => Decision::Deny(DenyReason::NotOwner),
        Role::Representative => Decision::Deny(floor_mismatch(actor)),
        _ => Decision::Deny(DenyReason::RoleNotPermitted),
      }
    }

    Action::Update => match actor.role {
      Role::Representative if entity.created_by == Some(actor.user_id) => {
        Decision::Allow
      }
      Role::Representative => Decision::Deny(DenyReason::NotOwner),
      _ => Decision::Deny(DenyReason::RoleNotPermitted),
    },

    Action::Delete => match actor.role {
      Role::Representative => {
        let is_author = entity.created_by == Some(actor.user_id);
        let same_floor =
          actor.floor.is_some() && entity.floor == actor.floor;
        if is_author || same_floor {
          Decision::Allow
        } else {
          Decision::Deny(DenyReason::NotOwner)
        }
      }
      _ => Decision::Deny(DenyReason::RoleNotPermitted),
    },

    Action::ChangeStatus => Decision::Deny(DenyReason::RoleNotPermitted),
  }
}

pub(super) fn read_allowed(actor: &Actor, entity: &EntityRef) -> bool {
  match actor.role {
    Role::Resident => owns_resident(actor, entity),
    Role::Representative => {
      actor.floor.is_some() && entity.floor == actor.floor
    }
    _ => false,
  }
}
