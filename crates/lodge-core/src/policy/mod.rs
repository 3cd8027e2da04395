//! The scope resolver: a pure decision layer for role/floor/ownership
//! authorization.
//!
//! Every rule is declared once, in the per-entity module it belongs to,
//! instead of being repeated inside each service. [`authorize`] answers the
//! single-entity question; [`read_filter`] yields the equivalent set
//! predicate for read-many operations. The two are kept logically
//! equivalent (there is a test enumerating actor/entity grids for exactly
//! that).
//!
//! No I/O happens here; callers fetch whatever descriptors they need first
//! and the resolver decides on those snapshots alone.

mod assembly;
mod measure;
mod news;
mod report;
mod residence;


use serde::Serialize;
use uuid::Uuid;

use crate::{
  actor::Actor,
  assembly::{Assembly, AssemblyStatus},
  measure::MeasureView,
  news::News,
  report::ReportView,
  resident::ResidentWithRoom,
  role::Role,
  room::Room,
};

// ─── Vocabulary ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Create,
  Read,
  Update,
  Delete,
  ChangeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
  Assembly,
  Report,
  Measure,
  News,
  Resident,
  Room,
  User,
  Service,
}

/// Why an operation was refused. Carried into the error taxonomy and the
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DenyReason {
  NotOwner,
  WrongFloor,
  RoleNotPermitted,
  InvalidLifecycleTransition,
  MissingFloorAssignment,
}

impl std::fmt::Display for DenyReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let msg = match self {
      DenyReason::NotOwner => "you do not own this record",
      DenyReason::WrongFloor => "this record belongs to another floor",
      DenyReason::RoleNotPermitted => "your role does not permit this operation",
      DenyReason::InvalidLifecycleTransition => {
        "the record's current status does not allow this operation"
      }
      DenyReason::MissingFloorAssignment => "this role has no assigned floor",
    };
    f.write_str(msg)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Allow,
  Deny(DenyReason),
}

impl Decision {
  pub fn is_allow(self) -> bool { self == Decision::Allow }

  /// Convert to the crate error, for call sites that stop on deny.
  pub fn into_result(self) -> crate::Result<()> {
    match self {
      Decision::Allow => Ok(()),
      Decision::Deny(reason) => Err(crate::Error::Denied(reason)),
    }
  }
}

// ─── Entity descriptor ───────────────────────────────────────────────────────

/// The policy-relevant attributes of a target entity, detached from the
/// stored record. Built from immutable snapshots; the resolver never sees
/// live documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
  pub kind:        EntityKind,
  /// Owning floor. `None` means building-wide ("general") or unassigned.
  pub floor:       Option<u8>,
  /// Creator's user id, where ownership matters.
  pub created_by:  Option<Uuid>,
  /// Owning resident, for records attached to one.
  pub resident_id: Option<Uuid>,
  /// Current lifecycle state, for status-bearing records.
  pub status:      Option<AssemblyStatus>,
}

impl EntityRef {
  fn bare(kind: EntityKind) -> Self {
    EntityRef {
      kind,
      floor: None,
      created_by: None,
      resident_id: None,
      status: None,
    }
  }

  pub fn assembly(a: &Assembly) -> Self {
    EntityRef {
      floor: a.floor,
      created_by: Some(a.created_by),
      status: Some(a.status),
      ..Self::bare(EntityKind::Assembly)
    }
  }

  /// Descriptor for an assembly yet to be created.
  pub fn new_assembly(floor: Option<u8>) -> Self {
    EntityRef { floor, ..Self::bare(EntityKind::Assembly) }
  }

  pub fn report(view: &ReportView) -> Self {
    EntityRef {
      floor: view.floor(),
      created_by: Some(view.report.created_by),
      resident_id: Some(view.report.resident_id),
      ..Self::bare(EntityKind::Report)
    }
  }

  pub fn new_report() -> Self { Self::bare(EntityKind::Report) }

  pub fn measure(view: &MeasureView) -> Self {
    EntityRef {
      floor: view.floor(),
      created_by: Some(view.measure.created_by),
      resident_id: Some(view.measure.resident_id),
      ..Self::bare(EntityKind::Measure)
    }
  }

  /// Descriptor for a measure about to be created against `target`.
  pub fn new_measure(target: &ResidentWithRoom) -> Self {
    EntityRef {
      floor: target.floor(),
      resident_id: Some(target.resident.resident_id),
      ..Self::bare(EntityKind::Measure)
    }
  }

  pub fn news(n: &News) -> Self {
    EntityRef {
      floor: n.floor,
      created_by: Some(n.created_by),
      ..Self::bare(EntityKind::News)
    }
  }

  pub fn new_news(floor: Option<u8>) -> Self {
    EntityRef { floor, ..Self::bare(EntityKind::News) }
  }

  pub fn resident(view: &ResidentWithRoom) -> Self {
    EntityRef {
      floor: view.floor(),
      resident_id: Some(view.resident.resident_id),
      ..Self::bare(EntityKind::Resident)
    }
  }

  pub fn room(room: &Room) -> Self {
    EntityRef {
      floor: Some(room.floor),
      resident_id: room.current_resident,
      ..Self::bare(EntityKind::Room)
    }
  }

  pub fn new_room(floor: u8) -> Self {
    EntityRef { floor: Some(floor), ..Self::bare(EntityKind::Room) }
  }

  pub fn user() -> Self { Self::bare(EntityKind::User) }

  /// Services are floor-bound through their owning room.
  pub fn service(room_floor: Option<u8>) -> Self {
    EntityRef { floor: room_floor, ..Self::bare(EntityKind::Service) }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Decide whether `actor` may perform `action` on the entity described by
/// `entity`. Deterministic and side-effect free.
///
/// Admin short-circuits to Allow for every action on every entity type; no
/// entity policy can override that.
pub fn authorize(actor: &Actor, action: Action, entity: &EntityRef) -> Decision {
  if actor.role == Role::Admin {
    return Decision::Allow;
  }
  match entity.kind {
    EntityKind::Assembly => assembly::check(actor, action, entity),
    EntityKind::Report => report::check(actor, action, entity),
    EntityKind::Measure => measure::check(actor, action, entity),
    EntityKind::News => news::check(actor, action, entity),
    EntityKind::Resident
    | EntityKind::Room
    | EntityKind::User
    | EntityKind::Service => residence::check(actor, action, entity),
  }
}

/// The set-filter form of the Read decision: keeps exactly the entities for
/// which [`authorize`] with [`Action::Read`] allows.
///
/// Handlers use this to scope list responses instead of issuing one
/// authorize call per row.
pub fn read_filter<'a>(
  actor: &'a Actor,
  kind: EntityKind,
) -> impl Fn(&EntityRef) -> bool + 'a {
  move |entity| {
    debug_assert_eq!(entity.kind, kind);
    if actor.role == Role::Admin {
      return true;
    }
    match kind {
      EntityKind::Assembly => assembly::read_allowed(actor, entity),
      EntityKind::Report => report::read_allowed(actor, entity),
      EntityKind::Measure => measure::read_allowed(actor, entity),
      EntityKind::News => news::read_allowed(actor, entity),
      EntityKind::Resident
      | EntityKind::Room
      | EntityKind::User
      | EntityKind::Service => residence::read_allowed(actor, entity),
    }
  }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

/// General ∪ own-floor visibility, the common scoping rule for assemblies
/// and news.
fn floor_visible(actor: &Actor, entity_floor: Option<u8>) -> bool {
  match entity_floor {
    None => true,
    Some(f) => actor.floor == Some(f),
  }
}

/// Deny reason for a failed floor check: a floor-scoped role without a
/// floor is a configuration problem, anyone else is simply on the wrong
/// floor.
fn floor_mismatch(actor: &Actor) -> DenyReason {
  if actor.role.is_floor_scoped() && actor.floor.is_none() {
    DenyReason::MissingFloorAssignment
  } else {
    DenyReason::WrongFloor
  }
}

/// Ownership via the actor's linked resident record.
fn owns_resident(actor: &Actor, entity: &EntityRef) -> bool {
  entity.resident_id.is_some() && entity.resident_id == actor.resident_id
}
