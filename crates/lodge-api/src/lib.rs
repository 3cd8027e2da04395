//! JSON REST API for the Lodge residence-management backend.
//!
//! Exposes an axum [`Router`] backed by any
//! [`lodge_core::store::ResidenceStore`]. All routes except
//! `/auth/register` and `/auth/login` require a Bearer JWT; the token's
//! claims become the [`Actor`](lodge_core::actor::Actor) every policy
//! decision runs against.

pub mod assemblies;
pub mod auth;
pub mod error;
pub mod measures;
pub mod news;
pub mod reports;
pub mod residents;
pub mod rooms;
pub mod services;
pub mod stats;
pub mod users;

#[cfg(test)]
mod tests;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, patch, post},
};
use lodge_core::store::ResidenceStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_token_ttl() -> u64 { 24 * 60 * 60 }

/// Runtime server configuration, deserialised from `config.toml` and
/// `LODGE_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  pub jwt_secret:     String,
  #[serde(default = "default_token_ttl")]
  pub token_ttl_secs: u64,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: ResidenceStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: ResidenceStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    AppState {
      store: Arc::clone(&self.store),
      auth:  Arc::clone(&self.auth),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the fully-materialised application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ResidenceStore + 'static,
{
  Router::new()
    // Auth (public)
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .patch(users::update::<S>)
        .delete(users::delete::<S>),
    )
    // Residents
    .route(
      "/residents",
      get(residents::list::<S>).post(residents::create::<S>),
    )
    .route(
      "/residents/{id}",
      get(residents::get_one::<S>)
        .patch(residents::update::<S>)
        .delete(residents::delete::<S>),
    )
    // Rooms
    .route("/rooms", get(rooms::list::<S>).post(rooms::create::<S>))
    .route("/rooms/sync-occupancy", post(rooms::sync_occupancy::<S>))
    .route(
      "/rooms/{id}",
      get(rooms::get_one::<S>)
        .patch(rooms::update::<S>)
        .delete(rooms::delete::<S>),
    )
    .route("/rooms/{id}/services", get(rooms::list_services::<S>))
    .route("/rooms/{id}/assign", post(rooms::assign::<S>))
    .route("/rooms/{id}/release", post(rooms::release::<S>))
    // Assemblies
    .route(
      "/assemblies",
      get(assemblies::list::<S>).post(assemblies::create::<S>),
    )
    .route(
      "/assemblies/{id}",
      get(assemblies::get_one::<S>)
        .patch(assemblies::update::<S>)
        .delete(assemblies::delete::<S>),
    )
    .route("/assemblies/{id}/status", patch(assemblies::change_status::<S>))
    // Disciplinary measures
    .route(
      "/measures",
      get(measures::list::<S>).post(measures::create::<S>),
    )
    .route(
      "/measures/{id}",
      get(measures::get_one::<S>)
        .patch(measures::update::<S>)
        .delete(measures::delete::<S>),
    )
    .route(
      "/measures/resident/{student_code}",
      get(measures::list_for_student::<S>),
    )
    // Reports
    .route("/reports", get(reports::list::<S>).post(reports::create::<S>))
    .route(
      "/reports/{id}",
      get(reports::get_one::<S>)
        .patch(reports::update::<S>)
        .delete(reports::delete::<S>),
    )
    .route("/reports/resident/{id}", get(reports::list_for_resident::<S>))
    // News
    .route("/news", get(news::list::<S>).post(news::create::<S>))
    .route("/news/{id}", get(news::get_one::<S>).delete(news::delete::<S>))
    // Services
    .route(
      "/services",
      get(services::list::<S>).post(services::create::<S>),
    )
    .route(
      "/services/{id}",
      get(services::get_one::<S>)
        .patch(services::update::<S>)
        .delete(services::delete::<S>),
    )
    // Stats
    .route("/stats", get(stats::snapshot::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
