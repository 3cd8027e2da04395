//! Handlers for `/users` — account administration. Admin-only end to end;
//! the User entity policy denies every other role.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  policy::{self, Action, EntityRef},
  role::Role,
  store::ResidenceStore,
  user::{NewUser, User},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::hash_password,
  error::{ApiError, store_err},
};

/// `GET /users`
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Read, &EntityRef::user()).into_result()?;
  let users = state.store.list_users().await.map_err(store_err)?;
  Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
  pub full_name:   String,
  pub email:       String,
  pub password:    String,
  pub role:        String,
  pub floor:       Option<u8>,
  pub resident_id: Option<Uuid>,
}

/// `POST /users`
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Create, &EntityRef::user()).into_result()?;

  let role: Role = body.role.parse().map_err(ApiError::from)?;
  let input = NewUser {
    full_name:     body.full_name,
    email:         body.email,
    password_hash: hash_password(&body.password)?,
    role,
    floor:         body.floor,
    resident_id:   body.resident_id,
  }
  .validate()?;

  if state
    .store
    .find_user_by_email(&input.email)
    .await
    .map_err(store_err)?
    .is_some()
  {
    return Err(ApiError::Conflict("email already registered".into()));
  }

  let user = state.store.insert_user(input).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Read, &EntityRef::user()).into_result()?;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
  pub full_name:   Option<String>,
  pub email:       Option<String>,
  pub password:    Option<String>,
  pub role:        Option<String>,
  pub floor:       Option<u8>,
  pub active:      Option<bool>,
  pub resident_id: Option<Uuid>,
}

/// `PATCH /users/{id}`
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateUserBody>,
) -> Result<Json<User>, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Update, &EntityRef::user()).into_result()?;

  let mut user = state
    .store
    .get_user(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  if let Some(full_name) = body.full_name {
    user.full_name = full_name;
  }
  if let Some(email) = body.email {
    let email = email.trim().to_lowercase();
    if email != user.email {
      if state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(store_err)?
        .is_some()
      {
        return Err(ApiError::Conflict("email already registered".into()));
      }
      user.email = email;
    }
  }
  if let Some(password) = body.password {
    user.password_hash = hash_password(&password)?;
  }
  if let Some(role) = body.role {
    user.role = role.parse().map_err(ApiError::from)?;
  }
  if let Some(floor) = body.floor {
    user.floor = Some(floor);
  }
  if let Some(active) = body.active {
    user.active = active;
  }
  if let Some(resident_id) = body.resident_id {
    user.resident_id = Some(resident_id);
  }

  if user.role.is_floor_scoped() && user.floor.is_none() {
    return Err(ApiError::Validation(format!(
      "a {} must have an assigned floor",
      user.role.as_str()
    )));
  }

  state.store.update_user(&user).await.map_err(store_err)?;
  Ok(Json(user))
}

/// `DELETE /users/{id}`
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Delete, &EntityRef::user()).into_result()?;
  if state.store.delete_user(id).await.map_err(store_err)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("user {id} not found")))
  }
}
