//! Assembly policy.
//!
//! Create general → president/secretary-general (admin short-circuits
//! earlier). Create floor → the floor's representative (floor auto-bound by
//! the caller) or the general set with an explicit floor. Reads are
//! general ∪ own-floor for everyone below the high roles. Mutations are
//! high-role or own-floor-representative, gated by the status machine.

use crate::{actor::Actor, assembly::AssemblyStatus, role::Role};

use super::{Action, Decision, DenyReason, EntityRef, floor_mismatch, floor_visible};

pub(super) fn check(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  match action {
    Action::Create => check_create(actor, entity),
    Action::Read => {
      if read_allowed(actor, entity) {
        Decision::Allow
      } else {
        Decision::Deny(floor_mismatch(actor))
      }
    }
    Action::Update | Action::Delete | Action::ChangeStatus => {
      check_mutation(actor, action, entity)
    }
  }
}

fn check_create(actor: &Actor, entity: &EntityRef) -> Decision {
  match entity.floor {
    // General assembly.
    None if actor.role.publishes_general() => Decision::Allow,
    None => Decision::Deny(DenyReason::RoleNotPermitted),
    // Floor assembly.
    Some(_) => match actor.role {
      Role::Representative => {
        if actor.floor.is_some() {
          Decision::Allow
        } else {
          Decision::Deny(DenyReason::MissingFloorAssignment)
        }
      }
      r if r.publishes_general() => Decision::Allow,
      _ => Decision::Deny(DenyReason::RoleNotPermitted),
    },
  }
}

pub(super) fn read_allowed(actor: &Actor, entity: &EntityRef) -> bool {
  actor.role.is_high() || floor_visible(actor, entity.floor)
}

fn check_mutation(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  // Role and floor gate first, lifecycle second: a wrong-floor deny should
  // not leak lifecycle information.
  let role_ok = if actor.role.is_high() {
    Decision::Allow
  } else if actor.role == Role::Representative {
    match entity.floor {
      // Representatives have no say over general assemblies.
      None => Decision::Deny(DenyReason::RoleNotPermitted),
      Some(f) if actor.floor == Some(f) => Decision::Allow,
      Some(_) => Decision::Deny(floor_mismatch(actor)),
    }
  } else {
    Decision::Deny(DenyReason::RoleNotPermitted)
  };

  if let Decision::Deny(_) = role_ok {
    return role_ok;
  }

  let status = entity.status.unwrap_or(AssemblyStatus::Programada);
  let lifecycle_ok = match action {
    Action::Update => status.allows_update(),
    Action::Delete => status.allows_delete(),
    Action::ChangeStatus => status.allows_status_change(),
    _ => true,
  };

  if lifecycle_ok {
    Decision::Allow
  } else {
    Decision::Deny(DenyReason::InvalidLifecycleTransition)
  }
}
