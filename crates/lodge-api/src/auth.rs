//! Bearer-token authentication: argon2 password handling, JWT minting and
//! verification, and the [`Actor`] request extractor.
//!
//! Tokens are HS256-signed and carry everything the policy layer needs, so
//! no store round-trip happens per request.

use std::time::{SystemTime, UNIX_EPOCH};

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{StatusCode, header::AUTHORIZATION, request::Parts},
  response::IntoResponse,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lodge_core::{
  actor::Actor,
  role::Role,
  store::ResidenceStore,
  user::{NewUser, User},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::{ApiError, store_err}};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Token signing configuration, shared across all handlers.
#[derive(Clone)]
pub struct AuthConfig {
  /// HS256 signing secret.
  pub jwt_secret:     String,
  /// Token lifetime in seconds.
  pub token_ttl_secs: u64,
}

// ─── Passwords ───────────────────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Configuration(format!("argon2 error: {e}")))
}

pub fn verify_password(password: &str, phc_hash: &str) -> bool {
  PasswordHash::new(phc_hash)
    .and_then(|parsed| {
      Argon2::default().verify_password(password.as_bytes(), &parsed)
    })
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// JWT claims: the subject plus the scope attributes policies decide on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub sub:         Uuid,
  pub role:        Role,
  pub floor:       Option<u8>,
  pub resident_id: Option<Uuid>,
  pub iat:         u64,
  pub exp:         u64,
}

pub fn mint_token(config: &AuthConfig, user: &User) -> Result<String, ApiError> {
  let now = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_err(|e| ApiError::Configuration(format!("system time error: {e}")))?
    .as_secs();

  let claims = Claims {
    sub:         user.user_id,
    role:        user.role,
    floor:       user.floor,
    resident_id: user.resident_id,
    iat:         now,
    exp:         now + config.token_ttl_secs,
  };

  jsonwebtoken::encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
  )
  .map_err(|e| ApiError::Configuration(format!("failed to sign token: {e}")))
}

pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
  jsonwebtoken::decode::<Claims>(
    token,
    &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .map(|data| data.claims)
  .map_err(|_| ApiError::Unauthorized)
}

// ─── Extractor ───────────────────────────────────────────────────────────────

impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: ResidenceStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;
    let token = header
      .strip_prefix("Bearer ")
      .ok_or(ApiError::Unauthorized)?;

    let claims = verify_token(&state.auth, token)?;
    Ok(Actor {
      user_id:     claims.sub,
      role:        claims.role,
      floor:       claims.floor,
      resident_id: claims.resident_id,
    })
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub full_name: String,
  pub email:     String,
  pub password:  String,
  /// Optional role name; absent means the registration default.
  pub role:      Option<String>,
  pub floor:     Option<u8>,
}

/// `POST /auth/register` — public. Unknown role names are a 400; duplicate
/// emails a 409.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ResidenceStore + 'static,
{
  let role = match body.role.as_deref() {
    Some(name) => name.parse::<Role>().map_err(ApiError::from)?,
    None => Role::DEFAULT_REGISTRATION,
  };

  let input = NewUser {
    full_name:     body.full_name,
    email:         body.email,
    password_hash: hash_password(&body.password)?,
    role,
    floor:         body.floor,
    resident_id:   None,
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
  tracing::info!(user_id = %user.user_id, role = user.role.as_str(), "registered user");
  Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  User,
}

/// `POST /auth/login` — public. Any failure (unknown email, bad password,
/// deactivated account) is the same 401.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: ResidenceStore + 'static,
{
  let user = state
    .store
    .find_user_by_email(body.email.trim())
    .await
    .map_err(store_err)?
    .ok_or(ApiError::Unauthorized)?;

  if !user.active || !verify_password(&body.password, &user.password_hash) {
    return Err(ApiError::Unauthorized);
  }

  let token = mint_token(&state.auth, &user)?;
  Ok(Json(LoginResponse { token, user }))
}
