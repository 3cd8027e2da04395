//! Policy for residents, rooms, room services, and user accounts.
//!
//! Management (create/update/delete) is an admin/representative privilege,
//! with representatives pinned to their own floor wherever the target has
//! one. Reads of rooms, residents, and services are open to any
//! authenticated actor; user-account administration is admin-only.

use crate::{actor::Actor, role::Role};

use super::{Action, Decision, DenyReason, EntityKind, EntityRef};

pub(super) fn check(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  if entity.kind == EntityKind::User {
    // Admin short-circuited earlier; nobody else manages accounts.
    return Decision::Deny(DenyReason::RoleNotPermitted);
  }

  match action {
    Action::Read => Decision::Allow,

    Action::Create | Action::Update | Action::Delete => match actor.role {
      Role::Representative => {
        let Some(actor_floor) = actor.floor else {
          return Decision::Deny(DenyReason::MissingFloorAssignment);
        };
        match entity.floor {
          // A resident without a room is not floor-bound yet.
          None => Decision::Allow,
          Some(f) if f == actor_floor => Decision::Allow,
          Some(_) => Decision::Deny(DenyReason::WrongFloor),
        }
      }
      _ => Decision::Deny(DenyReason::RoleNotPermitted),
    },

    Action::ChangeStatus => Decision::Deny(DenyReason::RoleNotPermitted),
  }
}

pub(super) fn read_allowed(actor: &Actor, entity: &EntityRef) -> bool {
  let _ = actor;
  entity.kind != EntityKind::User
}
