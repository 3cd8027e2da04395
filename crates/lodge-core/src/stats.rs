//! The aggregation engine behind `GET /stats`.
//!
//! Read-only: issues independent reads against the store and composes them
//! into a [`StatsSnapshot`]. Scope is derived from the actor — building-wide
//! for high roles, floor-restricted for floor offices, and a degenerate
//! single-resident snapshot for plain residents. A floor-scoped actor with
//! no floor fails before any read happens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  actor::Actor,
  role::Role,
  store::ResidenceStore,
};

/// Length cap of the merged recent-activity feed.
pub const RECENT_FEED_CAP: usize = 10;

// ─── Snapshot types ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FloorOccupancy {
  pub floor:          u8,
  pub total_rooms:    u32,
  pub occupied_rooms: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorStats {
  pub floor:            u8,
  pub total_rooms:      u32,
  pub occupied_rooms:   u32,
  pub free_rooms:       u32,
  pub total_residents:  u32,
  pub active_residents: u32,
  pub reports_count:    u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
  Report,
  NewResident,
  Assembly,
  Disciplinary,
  News,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
  pub kind:        ActivityKind,
  pub title:       String,
  pub resident:    Option<String>,
  pub room_number: Option<u32>,
  pub floor:       Option<u8>,
  pub date:        DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
  pub total_residents:    u32,
  pub active_residents:   u32,
  pub total_rooms:        u32,
  pub occupied_rooms:     u32,
  pub free_rooms:         u32,
  pub reports_count:      u32,
  pub occupancy_by_floor: Vec<FloorOccupancy>,
  /// Per-floor buckets; only populated for building-wide snapshots.
  pub floors:             Vec<FloorStats>,
  pub recent_activities:  Vec<RecentActivity>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Compute the statistics snapshot the actor is entitled to.
pub async fn compute_stats<S>(store: &S, actor: &Actor) -> Result<StatsSnapshot>
where
  S: ResidenceStore,
{
  let scope = match actor.role {
    Role::Resident => return resident_snapshot(store, actor).await,
    Role::Representative | Role::FloorAuditor => Some(actor.scope_floor()?),
    _ => None,
  };

  global_snapshot(store, scope).await
}

/// The degenerate 0/1 snapshot for a single resident.
async fn resident_snapshot<S>(store: &S, actor: &Actor) -> Result<StatsSnapshot>
where
  S: ResidenceStore,
{
  let resident_id = match actor.resident_id {
    Some(id) => id,
    None => {
      let by_user = store
        .find_resident_by_user(actor.user_id)
        .await
        .map_err(Error::store)?;
      by_user
        .ok_or_else(|| Error::not_found("resident", actor.user_id))?
        .resident_id
    }
  };

  let view = store
    .resident_with_room(resident_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::not_found("resident", resident_id))?;

  let active = match view.resident.user_id {
    Some(user_id) => store
      .get_user(user_id)
      .await
      .map_err(Error::store)?
      .is_some_and(|u| u.active),
    None => false,
  };

  let reports = store
    .list_reports_for_resident(resident_id)
    .await
    .map_err(Error::store)?;

  let has_room = u32::from(view.room.is_some());
  Ok(StatsSnapshot {
    total_residents:    1,
    active_residents:   u32::from(active),
    total_rooms:        has_room,
    occupied_rooms:     has_room,
    free_rooms:         0,
    reports_count:      reports.len() as u32,
    occupancy_by_floor: Vec::new(),
    floors:             Vec::new(),
    recent_activities:  Vec::new(),
  })
}

async fn global_snapshot<S>(store: &S, scope: Option<u8>) -> Result<StatsSnapshot>
where
  S: ResidenceStore,
{
  // Independent reads; merged below.
  let rooms = store.list_rooms(scope).await.map_err(Error::store)?;
  let residents = store
    .list_residents_with_rooms()
    .await
    .map_err(Error::store)?;
  let users = store.list_users().await.map_err(Error::store)?;
  let reports = store.list_report_views().await.map_err(Error::store)?;
  let assemblies = store.list_assemblies().await.map_err(Error::store)?;
  let measures = store.list_measure_views().await.map_err(Error::store)?;
  let news = store.list_news().await.map_err(Error::store)?;

  let in_scope = |floor: Option<u8>| match scope {
    None => true,
    Some(f) => floor == Some(f),
  };

  let active_by_user: std::collections::HashMap<Uuid, bool> =
    users.iter().map(|u| (u.user_id, u.active)).collect();
  let is_active = |user_id: Option<Uuid>| {
    user_id.is_some_and(|id| active_by_user.get(&id).copied().unwrap_or(false))
  };

  let residents: Vec<_> = residents
    .into_iter()
    .filter(|r| in_scope(r.floor()))
    .collect();
  let reports: Vec<_> = reports
    .into_iter()
    .filter(|r| in_scope(r.floor()))
    .collect();
  let measures: Vec<_> = measures
    .into_iter()
    .filter(|m| in_scope(m.floor()))
    .collect();
  let assemblies: Vec<_> = assemblies
    .into_iter()
    .filter(|a| in_scope(a.floor))
    .collect();
  let news: Vec<_> = news.into_iter().filter(|n| in_scope(n.floor)).collect();

  let total_rooms = rooms.len() as u32;
  let occupied_rooms =
    rooms.iter().filter(|r| r.current_resident.is_some()).count() as u32;

  let occupancy_by_floor = {
    let mut floors: Vec<u8> = rooms.iter().map(|r| r.floor).collect();
    floors.sort_unstable();
    floors.dedup();
    floors
      .into_iter()
      .map(|floor| {
        let floor_rooms: Vec<_> =
          rooms.iter().filter(|r| r.floor == floor).collect();
        FloorOccupancy {
          floor,
          total_rooms:    floor_rooms.len() as u32,
          occupied_rooms: floor_rooms
            .iter()
            .filter(|r| r.current_resident.is_some())
            .count() as u32,
        }
      })
      .collect::<Vec<_>>()
  };

  // Per-floor buckets only make sense building-wide.
  let floors = if scope.is_none() {
    occupancy_by_floor
      .iter()
      .map(|occ| {
        let floor = occ.floor;
        let floor_residents: Vec<_> = residents
          .iter()
          .filter(|r| r.floor() == Some(floor))
          .collect();
        FloorStats {
          floor,
          total_rooms: occ.total_rooms,
          occupied_rooms: occ.occupied_rooms,
          free_rooms: occ.total_rooms - occ.occupied_rooms,
          total_residents: floor_residents.len() as u32,
          active_residents: floor_residents
            .iter()
            .filter(|r| is_active(r.resident.user_id))
            .count() as u32,
          reports_count: reports
            .iter()
            .filter(|r| r.floor() == Some(floor))
            .count() as u32,
        }
      })
      .collect()
  } else {
    Vec::new()
  };

  // Merge the activity feed: tag, sort by timestamp descending, cap.
  let mut activities: Vec<RecentActivity> = Vec::new();

  activities.extend(reports.iter().map(|r| RecentActivity {
    kind:        ActivityKind::Report,
    title:       r.report.reason.clone(),
    resident:    r.resident.as_ref().map(|v| v.resident.full_name.clone()),
    room_number: r
      .resident
      .as_ref()
      .and_then(|v| v.room.as_ref())
      .map(|room| room.number),
    floor:       r.floor(),
    date:        r.report.date,
  }));

  activities.extend(residents.iter().map(|r| RecentActivity {
    kind:        ActivityKind::NewResident,
    title:       format!("New resident: {}", r.resident.full_name),
    resident:    Some(r.resident.full_name.clone()),
    room_number: r.room.as_ref().map(|room| room.number),
    floor:       r.floor(),
    date:        r.resident.enrolled_at,
  }));

  activities.extend(assemblies.iter().map(|a| RecentActivity {
    kind:        ActivityKind::Assembly,
    title:       a.title.clone(),
    resident:    None,
    room_number: None,
    floor:       a.floor,
    date:        a.created_at,
  }));

  activities.extend(measures.iter().map(|m| RecentActivity {
    kind:        ActivityKind::Disciplinary,
    title:       m.measure.title.clone(),
    resident:    m.resident.as_ref().map(|v| v.resident.full_name.clone()),
    room_number: m
      .resident
      .as_ref()
      .and_then(|v| v.room.as_ref())
      .map(|room| room.number),
    floor:       m.floor(),
    date:        m.measure.created_at,
  }));

  activities.extend(news.iter().map(|n| RecentActivity {
    kind:        ActivityKind::News,
    title:       n.title.clone(),
    resident:    None,
    room_number: None,
    floor:       n.floor,
    date:        n.published_at,
  }));

  activities.sort_by(|a, b| b.date.cmp(&a.date));
  activities.truncate(RECENT_FEED_CAP);

  Ok(StatsSnapshot {
    total_residents: residents.len() as u32,
    active_residents: residents
      .iter()
      .filter(|r| is_active(r.resident.user_id))
      .count() as u32,
    total_rooms,
    occupied_rooms,
    free_rooms: total_rooms - occupied_rooms,
    reports_count: reports.len() as u32,
    occupancy_by_floor,
    floors,
    recent_activities: activities,
  })
}
