//! News items, building-wide or floor-scoped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsType {
  General,
  Floor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
  pub news_id:      Uuid,
  pub title:        String,
  pub content:      String,
  pub news_type:    NewsType,
  /// Set iff `news_type` is [`NewsType::Floor`].
  pub floor:        Option<u8>,
  pub published_at: DateTime<Utc>,
  pub created_by:   Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNews {
  pub title:     String,
  pub content:   String,
  pub news_type: NewsType,
  /// Ignored for representatives: their floor item is always bound to
  /// their own floor.
  pub floor:     Option<u8>,
}

impl NewNews {
  pub fn validate(self) -> Result<Self> {
    if self.title.trim().is_empty() || self.content.trim().is_empty() {
      return Err(Error::Validation("title and content are required".into()));
    }
    match self.news_type {
      NewsType::Floor if self.floor.is_none() => Err(Error::Validation(
        "a floor news item requires a floor".into(),
      )),
      NewsType::General if self.floor.is_some() => Err(Error::Validation(
        "a general news item must not carry a floor".into(),
      )),
      _ => Ok(self),
    }
  }
}
