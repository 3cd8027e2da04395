//! Error types for `lodge-core`.
//!
//! Every denial or failure is detected synchronously at the point of
//! violation and propagated immediately. No retries happen at this layer;
//! transient storage failures surface as [`Error::Store`] untouched.

use thiserror::Error;

use crate::policy::DenyReason;

#[derive(Debug, Error)]
pub enum Error {
  /// The actor's role, floor, or ownership does not permit the operation.
  #[error("{0}")]
  Denied(DenyReason),

  /// An entity id (or unique key) did not resolve.
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: String },

  /// Missing required field, malformed reference, invalid enum value, or an
  /// invalid state-transition target.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Duplicate unique key (email, id number, room number) or a capacity
  /// ceiling reached.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Server-side misconfiguration, e.g. a floor-scoped actor with no floor
  /// assigned. Never retried.
  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    Error::NotFound { entity, id: id.to_string() }
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
