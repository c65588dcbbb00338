// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Child entity of a product. At most one live review per
/// (product, reviewer, order) — enforced by a partial unique index and
/// pre-checked in the service so the client gets a Conflict, not a 500.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductReview {
  pub id: Uuid,
  pub product_id: Uuid,
  pub reviewer_id: Uuid,
  pub order_id: Option<Uuid>,
  pub rating: i16,
  pub comment: String,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Child entity of a caretaker profile; one live review per reviewer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CaretakerReview {
  pub id: Uuid,
  pub caretaker_id: Uuid,
  pub reviewer_id: Uuid,
  pub rating: i16,
  pub comment: String,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
