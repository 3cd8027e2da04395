//! Handlers for `/services` — room amenities, floor-bound through their
//! owning room.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  policy::{self, Action, EntityRef},
  service::{NewService, Service},
  store::ResidenceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /services`
pub async fn list<S>(
  _actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Service>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let services = state.store.list_services().await.map_err(store_err)?;
  Ok(Json(services))
}

/// `POST /services`
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewService>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let input = body.validate()?;
  let room = state
    .store
    .get_room(input.room_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("room {} not found", input.room_id))
    })?;

  policy::authorize(&actor, Action::Create, &EntityRef::service(Some(room.floor)))
    .into_result()?;

  let service = state.store.insert_service(input).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(service)))
}

/// `GET /services/{id}`
pub async fn get_one<S>(
  _actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Service>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let (service, _) = fetch(&state, id).await?;
  Ok(Json(service))
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub schedule:    Option<String>,
}

/// `PATCH /services/{id}`
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateServiceBody>,
) -> Result<Json<Service>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let (mut service, room_floor) = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::service(room_floor))
    .into_result()?;

  if let Some(name) = body.name {
    if name.trim().is_empty() {
      return Err(ApiError::Validation("name is required".into()));
    }
    service.name = name;
  }
  if let Some(description) = body.description {
    service.description = Some(description);
  }
  if let Some(schedule) = body.schedule {
    service.schedule = Some(schedule);
  }

  state
    .store
    .update_service(&service)
    .await
    .map_err(store_err)?;
  Ok(Json(service))
}

/// `DELETE /services/{id}`
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let (_, room_floor) = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::service(room_floor))
    .into_result()?;

  state.store.delete_service(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// Fetch a service and the floor of its owning room.
async fn fetch<S>(
  state: &AppState<S>,
  id: Uuid,
) -> Result<(Service, Option<u8>), ApiError>
where
  S: ResidenceStore + 'static,
{
  let service = state
    .store
    .get_service(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("service {id} not found")))?;
  let floor = state
    .store
    .get_room(service.room_id)
    .await
    .map_err(store_err)?
    .map(|room| room.floor);
  Ok((service, floor))
}
