//! Error type for `lodge-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("column decode error: {0}")]
  Decode(String),

  /// A mutation referenced a room that does not exist.
  #[error("room not found: {0}")]
  RoomNotFound(uuid::Uuid),

  /// A mutation referenced a resident that does not exist.
  #[error("resident not found: {0}")]
  ResidentNotFound(uuid::Uuid),

  /// Unique-key violation detected before insert (email, id number,
  /// student code, room number).
  #[error("duplicate {0}")]
  Duplicate(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
