//! Handlers for `/assemblies`, including the status state machine.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  assembly::{Assembly, AssemblyStatus, AssemblyType, Attendance, NewAssembly, StatusChange},
  policy::{self, Action, EntityKind, EntityRef},
  role::Role,
  store::ResidenceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /assemblies` — general ∪ own-floor for floor-scoped actors.
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Assembly>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let keep = policy::read_filter(&actor, EntityKind::Assembly);
  let assemblies = state
    .store
    .list_assemblies()
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|a| keep(&EntityRef::assembly(a)))
    .collect();
  Ok(Json(assemblies))
}

/// `POST /assemblies`
///
/// A representative's floor assembly is always bound to their own floor,
/// whatever the body says.
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewAssembly>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut input = body;
  if actor.role == Role::Representative
    && input.assembly_type == AssemblyType::Floor
  {
    input.floor = actor.floor;
  }
  let input = input.validate()?;

  policy::authorize(&actor, Action::Create, &EntityRef::new_assembly(input.floor))
    .into_result()?;

  let assembly = state
    .store
    .insert_assembly(input, actor.user_id)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(assembly)))
}

/// `GET /assemblies/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Assembly>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let assembly = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Read, &EntityRef::assembly(&assembly))
    .into_result()?;
  Ok(Json(assembly))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssemblyBody {
  pub title:       Option<String>,
  pub date:        Option<String>,
  pub time:        Option<String>,
  pub location:    Option<String>,
  pub description: Option<String>,
  pub attendance:  Option<Attendance>,
}

/// `PATCH /assemblies/{id}` — blocked once the assembly has run or been
/// cancelled (the policy's lifecycle gate).
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateAssemblyBody>,
) -> Result<Json<Assembly>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut assembly = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::assembly(&assembly))
    .into_result()?;

  if let Some(title) = body.title {
    assembly.title = title;
  }
  if let Some(date) = body.date {
    assembly.date = date;
  }
  if let Some(time) = body.time {
    assembly.time = time;
  }
  if let Some(location) = body.location {
    assembly.location = location;
  }
  if let Some(description) = body.description {
    assembly.description = Some(description);
  }
  if let Some(attendance) = body.attendance {
    assembly.attendance = Some(attendance);
  }

  state
    .store
    .update_assembly(&assembly)
    .await
    .map_err(store_err)?;
  Ok(Json(assembly))
}

/// `PATCH /assemblies/{id}/status`
///
/// Only a Programada assembly can move; Aplazada requires a non-empty
/// reason and may carry a replacement date and time.
pub async fn change_status<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(change): Json<StatusChange>,
) -> Result<Json<Assembly>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut assembly = fetch(&state, id).await?;
  policy::authorize(&actor, Action::ChangeStatus, &EntityRef::assembly(&assembly))
    .into_result()?;
  change.validate()?;

  assembly.status = change.status;
  if change.status == AssemblyStatus::Aplazada {
    assembly.postponement_reason = change.postponement_reason;
    assembly.new_date = change.new_date;
    assembly.new_time = change.new_time;
  }

  state
    .store
    .update_assembly(&assembly)
    .await
    .map_err(store_err)?;
  Ok(Json(assembly))
}

/// `DELETE /assemblies/{id}` — a completed assembly is kept as a record.
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let assembly = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::assembly(&assembly))
    .into_result()?;

  state.store.delete_assembly(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

async fn fetch<S>(state: &AppState<S>, id: Uuid) -> Result<Assembly, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .get_assembly(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("assembly {id} not found")))
}
