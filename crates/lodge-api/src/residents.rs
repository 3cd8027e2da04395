//! Handlers for `/residents`.
//!
//! Reads are open to every authenticated role; mutations are admin or
//! own-floor representative per the residence policy.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  policy::{self, Action, EntityKind, EntityRef},
  resident::{NewResident, ResidentWithRoom},
  store::ResidenceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /residents`
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ResidentWithRoom>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let keep = policy::read_filter(&actor, EntityKind::Resident);
  let residents = state
    .store
    .list_residents_with_rooms()
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|view| keep(&EntityRef::resident(view)))
    .collect();
  Ok(Json(residents))
}

/// `POST /residents`
///
/// A `room_id` in the body is applied as a full assignment after the
/// insert, so both sides of the occupancy link move together.
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewResident>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut input = body.validate()?;
  let room_id = input.room_id.take();

  // Scope the decision to the target room's floor when one was named.
  let floor = match room_id {
    Some(id) => {
      let room = state
        .store
        .get_room(id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound(format!("room {id} not found")))?;
      Some(room.floor)
    }
    None => None,
  };
  let descriptor = EntityRef {
    kind: EntityKind::Resident,
    floor,
    created_by: None,
    resident_id: None,
    status: None,
  };
  policy::authorize(&actor, Action::Create, &descriptor).into_result()?;

  if state
    .store
    .find_resident_by_student_code(input.student_code)
    .await
    .map_err(store_err)?
    .is_some()
  {
    return Err(ApiError::Conflict("student code already enrolled".into()));
  }

  let resident = state.store.insert_resident(input).await.map_err(store_err)?;
  if let Some(room_id) = room_id {
    state
      .store
      .assign_resident(room_id, resident.resident_id)
      .await
      .map_err(store_err)?;
  }

  let view = state
    .store
    .resident_with_room(resident.resident_id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("resident {} not found", resident.resident_id))
    })?;
  Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /residents/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ResidentWithRoom>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Read, &EntityRef::resident(&view))
    .into_result()?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateResidentBody {
  pub full_name:        Option<String>,
  pub id_number:        Option<String>,
  pub student_code:     Option<u32>,
  pub email:            Option<String>,
  pub academic_program: Option<String>,
  pub period:           Option<String>,
  pub admission_year:   Option<u16>,
  pub phone:            Option<String>,
}

/// `PATCH /residents/{id}` — scalar fields only; room moves go through
/// the room assignment endpoints.
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateResidentBody>,
) -> Result<Json<ResidentWithRoom>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::resident(&view))
    .into_result()?;

  let mut resident = view.resident;
  if let Some(full_name) = body.full_name {
    resident.full_name = full_name;
  }
  if let Some(id_number) = body.id_number {
    resident.id_number = id_number;
  }
  if let Some(student_code) = body.student_code {
    if student_code != resident.student_code
      && state
        .store
        .find_resident_by_student_code(student_code)
        .await
        .map_err(store_err)?
        .is_some()
    {
      return Err(ApiError::Conflict("student code already enrolled".into()));
    }
    resident.student_code = student_code;
  }
  if let Some(email) = body.email {
    resident.email = Some(email);
  }
  if let Some(program) = body.academic_program {
    resident.academic_program = Some(program);
  }
  if let Some(period) = body.period {
    resident.period = Some(period);
  }
  if let Some(year) = body.admission_year {
    resident.admission_year = Some(year);
  }
  if let Some(phone) = body.phone {
    resident.phone = Some(phone);
  }

  // Re-run the input validation rules against the merged record.
  NewResident {
    full_name:        resident.full_name.clone(),
    id_number:        resident.id_number.clone(),
    student_code:     resident.student_code,
    email:            resident.email.clone(),
    academic_program: resident.academic_program.clone(),
    period:           resident.period.clone(),
    admission_year:   resident.admission_year,
    phone:            resident.phone.clone(),
    room_id:          resident.room_id,
    user_id:          resident.user_id,
  }
  .validate()?;

  state
    .store
    .update_resident(&resident)
    .await
    .map_err(store_err)?;
  let view = fetch(&state, id).await?;
  Ok(Json(view))
}

/// `DELETE /residents/{id}` — releases the resident's room in the same
/// unit of work.
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::resident(&view))
    .into_result()?;

  state.store.delete_resident(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

async fn fetch<S>(
  state: &AppState<S>,
  id: Uuid,
) -> Result<ResidentWithRoom, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .resident_with_room(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("resident {id} not found")))
}
