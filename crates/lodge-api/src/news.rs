//! Handlers for `/news` — building-wide and floor announcements.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  news::{NewNews, News, NewsType},
  policy::{self, Action, EntityKind, EntityRef},
  role::Role,
  store::ResidenceStore,
};
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /news` — general ∪ own-floor.
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<News>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let keep = policy::read_filter(&actor, EntityKind::News);
  let items = state
    .store
    .list_news()
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|n| keep(&EntityRef::news(n)))
    .collect();
  Ok(Json(items))
}

/// `POST /news` — a representative's floor item is always bound to their
/// own floor, whatever the body says.
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewNews>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let mut input = body;
  if actor.role == Role::Representative && input.news_type == NewsType::Floor {
    input.floor = actor.floor;
  }
  let input = input.validate()?;

  policy::authorize(&actor, Action::Create, &EntityRef::new_news(input.floor))
    .into_result()?;

  let item = state
    .store
    .insert_news(input, actor.user_id)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /news/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<News>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let item = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Read, &EntityRef::news(&item))
    .into_result()?;
  Ok(Json(item))
}

/// `DELETE /news/{id}` — the author or a general publisher.
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let item = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::news(&item))
    .into_result()?;

  state.store.delete_news(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

async fn fetch<S>(state: &AppState<S>, id: Uuid) -> Result<News, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .get_news(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("news item {id} not found")))
}
