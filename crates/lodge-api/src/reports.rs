//! Handlers for `/reports` — incident reports scoped by ownership and floor.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lodge_core::{
  actor::Actor,
  policy::{self, Action, EntityKind, EntityRef},
  report::{NewReport, ReportView},
  store::ResidenceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

/// `GET /reports` — admins and high roles see all, representatives their
/// floor, residents exactly their own.
pub async fn list<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ReportView>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let keep = policy::read_filter(&actor, EntityKind::Report);
  let reports = state
    .store
    .list_report_views()
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|view| keep(&EntityRef::report(view)))
    .collect();
  Ok(Json(reports))
}

/// `POST /reports` — the target resident is named by id or student code;
/// exactly one must resolve before anything is written.
pub async fn create<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Json(body): Json<NewReport>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  policy::authorize(&actor, Action::Create, &EntityRef::new_report())
    .into_result()?;
  let input = body.validate()?;

  let resident_id = match (input.resident_id, input.student_code) {
    (Some(id), _) => {
      state
        .store
        .get_resident(id)
        .await
        .map_err(store_err)?
        .ok_or_else(|| ApiError::NotFound(format!("resident {id} not found")))?
        .resident_id
    }
    (None, Some(code)) => {
      state
        .store
        .find_resident_by_student_code(code)
        .await
        .map_err(store_err)?
        .ok_or_else(|| {
          ApiError::NotFound(format!(
            "resident with student code {code} not found"
          ))
        })?
        .resident_id
    }
    (None, None) => {
      return Err(ApiError::Validation(
        "either resident_id or student_code is required".into(),
      ));
    }
  };

  let report = state
    .store
    .insert_report(input, resident_id, actor.user_id)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /reports/{id}`
pub async fn get_one<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Read, &EntityRef::report(&view))
    .into_result()?;
  Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReportBody {
  pub reason:       Option<String>,
  pub action_taken: Option<String>,
  pub urgent:       Option<bool>,
  pub location:     Option<String>,
  pub description:  Option<String>,
}

/// `PATCH /reports/{id}` — the creating representative (or an admin) only.
pub async fn update<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateReportBody>,
) -> Result<Json<ReportView>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Update, &EntityRef::report(&view))
    .into_result()?;

  let mut report = view.report;
  if let Some(reason) = body.reason {
    if reason.trim().is_empty() {
      return Err(ApiError::Validation("reason is required".into()));
    }
    report.reason = reason;
  }
  if let Some(action_taken) = body.action_taken {
    report.action_taken = Some(action_taken);
  }
  if let Some(urgent) = body.urgent {
    report.urgent = urgent;
  }
  if let Some(location) = body.location {
    report.location = Some(location);
  }
  if let Some(description) = body.description {
    report.description = Some(description);
  }

  state.store.update_report(&report).await.map_err(store_err)?;
  Ok(Json(fetch(&state, id).await?))
}

/// `DELETE /reports/{id}` — the author, a representative of the
/// resident's floor, or an admin.
pub async fn delete<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ResidenceStore + 'static,
{
  let view = fetch(&state, id).await?;
  policy::authorize(&actor, Action::Delete, &EntityRef::report(&view))
    .into_result()?;

  state.store.delete_report(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /reports/resident/{id}`
pub async fn list_for_resident<S>(
  actor: Actor,
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReportView>>, ApiError>
where
  S: ResidenceStore + 'static,
{
  if state
    .store
    .get_resident(id)
    .await
    .map_err(store_err)?
    .is_none()
  {
    return Err(ApiError::NotFound(format!("resident {id} not found")));
  }

  let keep = policy::read_filter(&actor, EntityKind::Report);
  let reports = state
    .store
    .list_reports_for_resident(id)
    .await
    .map_err(store_err)?
    .into_iter()
    .filter(|view| keep(&EntityRef::report(view)))
    .collect();
  Ok(Json(reports))
}

async fn fetch<S>(state: &AppState<S>, id: Uuid) -> Result<ReportView, ApiError>
where
  S: ResidenceStore + 'static,
{
  state
    .store
    .report_view(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("report {id} not found")))
}
