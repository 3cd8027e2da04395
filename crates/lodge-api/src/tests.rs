//! End-to-end handler tests: real router, in-memory store, signed tokens.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use lodge_core::{
  role::Role,
  store::ResidenceStore,
  user::{NewUser, User},
};
use lodge_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, auth, router};

fn make_auth() -> auth::AuthConfig {
  auth::AuthConfig {
    jwt_secret:     "test-secret".into(),
    token_ttl_secs: 3600,
  }
}

async fn make_state() -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState {
    store: Arc::new(store),
    auth:  Arc::new(make_auth()),
  }
}

/// Seed a user directly in the store and mint a token for them.
async fn seed_actor(
  state: &AppState<SqliteStore>,
  role: Role,
  floor: Option<u8>,
  resident_id: Option<Uuid>,
) -> (User, String) {
  let user = state
    .store
    .insert_user(NewUser {
      full_name: format!("{} test", role.as_str()),
      email: format!("{}-{}@example.com", role.as_str(), Uuid::new_v4()),
      password_hash: auth::hash_password("pw").unwrap(),
      role,
      floor,
      resident_id,
    })
    .await
    .unwrap();
  let token = auth::mint_token(&state.auth, &user).unwrap();
  (user, token)
}

async fn oneshot(
  state: AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  body: Option<Value>,
) -> axum::response::Response {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let req = builder.body(body).unwrap();
  router(state).oneshot(req).await.unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_token_is_401() {
  let state = make_state().await;
  let resp = oneshot(state, "GET", "/users", None, None).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_then_login_round_trip() {
  let state = make_state().await;
  let body = json!({
    "full_name": "Ana Gómez",
    "email": "Ana@Example.com",
    "password": "s3cret",
  });

  let resp = oneshot(
    state.clone(),
    "POST",
    "/auth/register",
    None,
    Some(body.clone()),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let registered = body_json(resp).await;
  assert_eq!(registered["email"], "ana@example.com");
  assert_eq!(registered["role"], "resident");
  assert!(registered.get("password_hash").is_none());

  // Same email again, any case, is a conflict.
  let resp =
    oneshot(state.clone(), "POST", "/auth/register", None, Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = oneshot(
    state.clone(),
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ana@example.com", "password": "s3cret" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let login = body_json(resp).await;
  let token = login["token"].as_str().unwrap().to_string();

  // The minted token opens an authenticated route.
  let resp = oneshot(state, "GET", "/stats", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
  let state = make_state().await;
  oneshot(
    state.clone(),
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "full_name": "Ana Gómez",
      "email": "ana@example.com",
      "password": "s3cret",
    })),
  )
  .await;

  let resp = oneshot(
    state,
    "POST",
    "/auth/login",
    None,
    Some(json!({ "email": "ana@example.com", "password": "wrong" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_with_unknown_role_is_400() {
  let state = make_state().await;
  let resp = oneshot(
    state,
    "POST",
    "/auth/register",
    None,
    Some(json!({
      "full_name": "Eve",
      "email": "eve@example.com",
      "password": "pw",
      "role": "superuser",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Rooms ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn room_number_outside_floor_range_is_400() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Admin, None, None).await;

  let resp = oneshot(
    state,
    "POST",
    "/rooms",
    Some(&token),
    Some(json!({ "number": 109, "floor": 1 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_room_number_is_409() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Admin, None, None).await;
  let body = json!({ "number": 101, "floor": 1 });

  let resp = oneshot(
    state.clone(),
    "POST",
    "/rooms",
    Some(&token),
    Some(body.clone()),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = oneshot(state, "POST", "/rooms", Some(&token), Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_floor_rejects_another_room() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Admin, None, None).await;

  // Floor 2 holds 34 rooms, 201-234.
  for number in 201..=234 {
    state
      .store
      .insert_room(lodge_core::room::NewRoom { number, floor: 2 })
      .await
      .unwrap();
  }

  let resp = oneshot(
    state,
    "POST",
    "/rooms",
    Some(&token),
    Some(json!({ "number": 201, "floor": 2 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body = body_json(resp).await;
  assert!(
    body["error"].as_str().unwrap().contains("maximum of 34 rooms"),
    "unexpected error: {body}"
  );
}

#[tokio::test]
async fn resident_cannot_create_rooms() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Resident, None, None).await;

  let resp = oneshot(
    state,
    "POST",
    "/rooms",
    Some(&token),
    Some(json!({ "number": 101, "floor": 1 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sync_occupancy_requires_admin() {
  let state = make_state().await;
  let (_, rep) = seed_actor(&state, Role::Representative, Some(2), None).await;
  let (_, admin) = seed_actor(&state, Role::Admin, None, None).await;

  let resp = oneshot(
    state.clone(),
    "POST",
    "/rooms/sync-occupancy",
    Some(&rep),
    None,
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let resp =
    oneshot(state, "POST", "/rooms/sync-occupancy", Some(&admin), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["repaired"], 0);
}

// ── Assemblies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn representative_floor_assembly_binds_their_own_floor() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Representative, Some(3), None).await;

  // The body claims floor 2; the actor's floor wins.
  let resp = oneshot(
    state,
    "POST",
    "/assemblies",
    Some(&token),
    Some(json!({
      "title": "Floor meeting",
      "assembly_type": "floor",
      "date": "2026-09-01",
      "time": "19:00",
      "location": "Kitchen",
      "floor": 2,
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let assembly = body_json(resp).await;
  assert_eq!(assembly["floor"], 3);
  assert_eq!(assembly["status"], "Programada");
}

#[tokio::test]
async fn representative_cannot_call_general_assembly() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Representative, Some(3), None).await;

  let resp = oneshot(
    state,
    "POST",
    "/assemblies",
    Some(&token),
    Some(json!({
      "title": "Everyone",
      "assembly_type": "general",
      "date": "2026-09-01",
      "time": "19:00",
      "location": "Hall",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn postponement_without_reason_is_400_and_status_is_one_shot() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::President, None, None).await;

  let resp = oneshot(
    state.clone(),
    "POST",
    "/assemblies",
    Some(&token),
    Some(json!({
      "title": "General assembly",
      "assembly_type": "general",
      "date": "2026-09-01",
      "time": "19:00",
      "location": "Hall",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let id = body_json(resp).await["assembly_id"]
    .as_str()
    .unwrap()
    .to_string();
  let uri = format!("/assemblies/{id}/status");

  let resp = oneshot(
    state.clone(),
    "PATCH",
    &uri,
    Some(&token),
    Some(json!({ "status": "Aplazada" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = oneshot(
    state.clone(),
    "PATCH",
    &uri,
    Some(&token),
    Some(json!({
      "status": "Aplazada",
      "postponement_reason": "quorum not reached",
      "new_date": "2026-09-15",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let assembly = body_json(resp).await;
  assert_eq!(assembly["status"], "Aplazada");
  assert_eq!(assembly["new_date"], "2026-09-15");

  // Aplazada is out of the initial state; no further status changes.
  let resp = oneshot(
    state,
    "PATCH",
    &uri,
    Some(&token),
    Some(json!({ "status": "Completada" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ── Reports ──────────────────────────────────────────────────────────────────

/// Seed a resident with a linked user account and a room on `floor`, and
/// return (resident_id, token for that resident's account).
async fn seed_resident_actor(
  state: &AppState<SqliteStore>,
  student_code: u32,
  room_number: u32,
  floor: u8,
) -> (Uuid, String) {
  let resident = state
    .store
    .insert_resident(lodge_core::resident::NewResident {
      full_name:        format!("Resident {student_code}"),
      id_number:        format!("id-{student_code}"),
      student_code,
      email:            None,
      academic_program: None,
      period:           None,
      admission_year:   None,
      phone:            None,
      room_id:          None,
      user_id:          None,
    })
    .await
    .unwrap();
  let room = state
    .store
    .insert_room(lodge_core::room::NewRoom {
      number: room_number,
      floor,
    })
    .await
    .unwrap();
  state
    .store
    .assign_resident(room.room_id, resident.resident_id)
    .await
    .unwrap();

  let (_, token) = seed_actor(
    state,
    Role::Resident,
    None,
    Some(resident.resident_id),
  )
  .await;
  (resident.resident_id, token)
}

#[tokio::test]
async fn resident_sees_only_their_own_reports() {
  let state = make_state().await;
  let (_, president) = seed_actor(&state, Role::President, None, None).await;
  let (_, admin) = seed_actor(&state, Role::Admin, None, None).await;
  let (mine, my_token) = seed_resident_actor(&state, 20201111, 201, 2).await;
  let (other, _) = seed_resident_actor(&state, 20202222, 301, 3).await;

  for (resident_id, reason) in [(mine, "noise"), (other, "smoking")] {
    let resp = oneshot(
      state.clone(),
      "POST",
      "/reports",
      Some(&president),
      Some(json!({ "resident_id": resident_id, "reason": reason })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  let resp = oneshot(state.clone(), "GET", "/reports", Some(&my_token), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let reports = body_json(resp).await;
  let reports = reports.as_array().unwrap();
  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0]["report"]["reason"], "noise");

  // Only admin has building-wide report visibility.
  let resp = oneshot(
    state.clone(),
    "GET",
    "/reports",
    Some(&president),
    None,
  )
  .await;
  assert!(body_json(resp).await.as_array().unwrap().is_empty());

  let resp = oneshot(state, "GET", "/reports", Some(&admin), None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn report_naming_no_resident_is_400() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::President, None, None).await;

  let resp = oneshot(
    state,
    "POST",
    "/reports",
    Some(&token),
    Some(json!({ "reason": "noise" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_for_unknown_student_code_is_404() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::President, None, None).await;

  let resp = oneshot(
    state,
    "POST",
    "/reports",
    Some(&token),
    Some(json!({ "student_code": 99999999, "reason": "noise" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Measures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_floor_representative_cannot_sanction() {
  let state = make_state().await;
  let (_, rep2) = seed_actor(&state, Role::Representative, Some(2), None).await;
  let (_, rep3) = seed_actor(&state, Role::Representative, Some(3), None).await;
  seed_resident_actor(&state, 20203333, 202, 2).await;

  let body = json!({
    "student_code": 20203333,
    "title": "Quiet hours",
    "description": "Repeated noise after midnight",
  });

  let resp = oneshot(
    state.clone(),
    "POST",
    "/measures",
    Some(&rep3),
    Some(body.clone()),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let resp = oneshot(state, "POST", "/measures", Some(&rep2), Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn resolved_measure_cannot_be_reopened() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::GeneralAuditor, None, None).await;
  seed_resident_actor(&state, 20204444, 401, 4).await;

  let resp = oneshot(
    state.clone(),
    "POST",
    "/measures",
    Some(&token),
    Some(json!({
      "student_code": 20204444,
      "title": "Kitchen duty",
      "description": "Left shared kitchen unusable",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let id = body_json(resp).await["measure_id"]
    .as_str()
    .unwrap()
    .to_string();
  let uri = format!("/measures/{id}");

  let resp = oneshot(
    state.clone(),
    "PATCH",
    &uri,
    Some(&token),
    Some(json!({ "status": "Resuelta" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["measure"]["status"], "Resuelta");

  let resp = oneshot(
    state,
    "PATCH",
    &uri,
    Some(&token),
    Some(json!({ "status": "Activa" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── News ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn floor_news_without_floor_is_400_even_for_admin() {
  let state = make_state().await;
  let (_, token) = seed_actor(&state, Role::Admin, None, None).await;

  // No representative auto-bind and no policy gate apply to admin; the
  // input validation alone must hold the floor/type pairing.
  let resp = oneshot(
    state,
    "POST",
    "/news",
    Some(&token),
    Some(json!({
      "title": "Floor notice",
      "content": "Kitchen closed for cleaning.",
      "news_type": "floor",
    })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── Stats ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_for_floorless_representative_is_a_configuration_error() {
  let state = make_state().await;
  // Inserted directly, bypassing input validation: a misconfigured account.
  let (_, token) = seed_actor(&state, Role::Representative, None, None).await;

  let resp = oneshot(state, "GET", "/stats", Some(&token), None).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  let body = body_json(resp).await;
  assert!(
    body["error"].as_str().unwrap().contains("no assigned floor"),
    "unexpected error: {body}"
  );
}

#[tokio::test]
async fn stats_are_floor_scoped_for_representatives() {
  let state = make_state().await;
  let (_, admin) = seed_actor(&state, Role::Admin, None, None).await;
  let (_, rep) = seed_actor(&state, Role::Representative, Some(2), None).await;
  seed_resident_actor(&state, 20205555, 203, 2).await;
  seed_resident_actor(&state, 20206666, 302, 3).await;

  let resp = oneshot(state.clone(), "GET", "/stats", Some(&admin), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let snapshot = body_json(resp).await;
  assert_eq!(snapshot["total_rooms"], 2);
  assert_eq!(snapshot["total_residents"], 2);
  assert_eq!(snapshot["floors"].as_array().unwrap().len(), 2);

  let resp = oneshot(state, "GET", "/stats", Some(&rep), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let snapshot = body_json(resp).await;
  assert_eq!(snapshot["total_rooms"], 1);
  assert_eq!(snapshot["total_residents"], 1);
  // Per-floor buckets are building-wide only.
  assert!(snapshot["floors"].as_array().unwrap().is_empty());
}
