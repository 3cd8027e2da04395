//! Handlers for `/measures` — disciplinary measures, resolved at most once.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  measure::{MeasureStatus, MeasureView, NewMeasure},
  policy::{self, Action, EntityKind, EntityRef},
  store::ResidenceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /measures` — high roles see everything, floor offices their own
/// floor, residents nothing.
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<MeasureView>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let keep = policy::read_filter(&actor, EntityKind::Measure);
  let measures = state
    .store
    .list_measure_views()
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|view| keep(&EntityRef::measure(view)))
    .collect();
  Ok(Json(measures))
}

/// `POST /measures` — the target resident is named by student code and
/// resolved before any authorization or write.
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewMeasure>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let input = body.validate()?;

  let resident = state
    .store
    .find_resident_by_student_code(input.student_code)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "resident with student code {} not found",
        input.student_code
      ))
    })?;
  let target = state
    .store
    .resident_with_room(resident.resident_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("resident {} not found", resident.resident_id))
    })?;

  policy::authorize(&actor, Action::Create, &EntityRef::new_measure(&target))
    .into_result()?;

  let measure = state
    .store
    .insert_measure(input, resident.resident_id, actor.user_id)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(measure)))
}

/// `GET /measures/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<MeasureView>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Read, &EntityRef::measure(&view))
    .into_result()?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateMeasureBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub status:      Option<MeasureStatus>,
}

/// `PATCH /measures/{id}`
///
/// Moving to Resuelta records the resolver once; a Resuelta measure never
/// goes back to Activa.
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateMeasureBody>,
) -> Result<Json<MeasureView>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  let action = if body.status.is_some() {
    Action::ChangeStatus
  } else {
    Action::Update
  };
  policy::authorize(&actor, action, &EntityRef::measure(&view)).into_result()?;

  let mut measure = view.measure;
  if let Some(title) = body.title {
    measure.title = title;
  }
  if let Some(description) = body.description {
    measure.description = description;
  }
  match body.status {
    Some(MeasureStatus::Resuelta) => measure.resolve(actor.user_id),
    Some(MeasureStatus::Activa) if measure.status == MeasureStatus::Resuelta => {
      return Err(ApiError::Validation(
        "a resolved measure cannot be reopened".into(),
      ));
    }
    _ => {}
  }

  state
    .store
    .update_measure(&measure)
    .await
    .map_err(store_err)?;
  Ok(Json(fetch(&state, id).await?))
}

/// `DELETE /measures/{id}`
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::measure(&view))
    .into_result()?;

  state.store.delete_measure(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /measures/resident/{student_code}`
pub async fn list_for_student<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(student_code): Path<u32>,
) -> Result<Json<Vec<MeasureView>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let resident = state
    .store
    .find_resident_by_student_code(student_code)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "resident with student code {student_code} not found"
      ))
    })?;

  let keep = policy::read_filter(&actor, EntityKind::Measure);
  let measures = state
    .store
    .list_measures_for_resident(resident.resident_id)
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|view| keep(&EntityRef::measure(view)))
    .collect();
  Ok(Json(measures))
}

async fn fetch<S>(state: &AppState<S>, id: Uuid) -> Result<MeasureView, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .measure_view(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("measure {id} not found")))
}
