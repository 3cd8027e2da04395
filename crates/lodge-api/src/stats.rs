//! Handler for `GET /stats` — thin glue over the core aggregation engine.

use axum::{Json, extract::State};
use lodge_core::{actor::Actor, stats::StatsSnapshot, store::ResidenceStore};

use crate::{AppState, error::ApiError};

/// `GET /stats` — the scope (building-wide, own floor, or single resident)
/// is derived from the actor inside the engine.
pub async fn snapshot<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<StatsSnapshot>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let snapshot = lodge_core::stats::compute_stats(state.store.as_ref(), &actor)
    .await
    .map_err(ApiError::from)?;
  Ok(Json(snapshot))
}
