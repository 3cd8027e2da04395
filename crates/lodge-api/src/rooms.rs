//! Handlers for `/rooms` — CRUD, occupancy assignment, per-room services,
//! and the occupancy repair sweep.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  policy::{self, Action, DenyReason, EntityRef},
  room::{self, NewRoom, Room},
  service::Service,
  store::ResidenceStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub floor: Option<u8>,
}

/// `GET /rooms[?floor=N]`
pub async fn list<S>(
  _actor: Actor,
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Room>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let rooms = state
    .store
    .list_rooms(params.floor)
    .await
    .map_err(store_err)?;
  Ok(Json(rooms))
}

/// `POST /rooms`
///
/// Rejects numbers outside the floor's range (400), duplicate numbers and
/// full floors (409).
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewRoom>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Create, &EntityRef::new_room(body.floor))
    .into_result()?;
  room::validate_room_number(body.number, body.floor)?;

  let capacity = room::floor_capacity(body.floor)?;
  let existing = state
    .store
    .count_rooms_on_floor(body.floor)
    .await
    .map_err(store_err)?;
  if existing >= capacity {
    return Err(ApiError::Conflict(format!(
      "floor {} already holds its maximum of {capacity} rooms",
      body.floor
    )));
  }

  let taken = state
    .store
    .list_rooms(Some(body.floor))
    .await
    .map_err(store_err)?
    .iter()
    .any(|r| r.number == body.number);
  if taken {
    return Err(ApiError::Conflict(format!(
      "room number {} already exists",
      body.number
    )));
  }

  let room = state.store.insert_room(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /rooms/{id}`
pub async fn get_one<S>(
  _actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError>
where
  S: ResidenceStore + 'static,
{
  Ok(Json(fetch(&state, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomBody {
  pub number: Option<u32>,
  pub floor:  Option<u8>,
}

/// `PATCH /rooms/{id}` — renumbering only; occupancy changes go through
/// assign/release.
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateRoomBody>,
) -> Result<Json<Room>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut room = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::room(&room))
    .into_result()?;

  if let Some(floor) = body.floor {
    room.floor = floor;
  }
  if let Some(number) = body.number {
    room.number = number;
  }
  room::validate_room_number(room.number, room.floor)?;

  state.store.update_room(&room).await.map_err(store_err)?;
  Ok(Json(room))
}

/// `DELETE /rooms/{id}` — occupied rooms must be released first.
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let room = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::room(&room))
    .into_result()?;
  if room.occupied {
    return Err(ApiError::Conflict(
      "room is occupied; release it before deleting".into(),
    ));
  }

  state.store.delete_room(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
  pub resident_id: Uuid,
}

/// `POST /rooms/{id}/assign`
pub async fn assign<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AssignBody>,
) -> Result<Json<Room>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let room = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::room(&room))
    .into_result()?;

  if state
    .store
    .get_resident(body.resident_id)
    .await
    .map_err(store_err)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!(
      "resident {} not found",
      body.resident_id
    )));
  }

  state
    .store
    .assign_resident(id, body.resident_id)
    .await
    .map_err(store_err)?;
  Ok(Json(fetch(&state, id).await?))
}

/// `POST /rooms/{id}/release`
pub async fn release<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Room>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let room = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::room(&room))
    .into_result()?;

  state.store.release_room(id).await.map_err(store_err)?;
  Ok(Json(fetch(&state, id).await?))
}

/// `GET /rooms/{id}/services`
pub async fn list_services<S>(
  _actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  fetch(&state, id).await?;
  let services = state
    .store
    .list_services_for_room(id)
    .await
    .map_err(store_err)?;
  Ok(Json(services))
}

/// `POST /rooms/sync-occupancy` — admin-only repair sweep re-deriving
/// every room's occupancy from the resident back-references.
pub async fn sync_occupancy<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  if !actor.is_admin() {
    return Err(ApiError::Denied(DenyReason::RoleNotPermitted));
  }

  let repaired = state.store.sync_occupancy().await.map_err(store_err)?;
  tracing::info!(repaired, "occupancy sync finished");
  Ok(Json(json!({ "repaired": repaired })))
}

async fn fetch<S>(state: &AppState<S>, id: Uuid) -> Result<Room, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .get_room(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("room {id} not found")))
}
