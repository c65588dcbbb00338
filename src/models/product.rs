// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub categories: Vec<String>,
  /// Image paths; upload handling itself lives outside this service.
  pub srcs: Vec<String>,
  pub short_desc: String,
  pub long_desc: String,
  pub price_amount: i64,
  pub price_currency: String,
  pub pot_size: Option<i32>,
  pub pot_unit: Option<String>,
  pub pot_type: Option<String>,
  pub seller_id: Uuid,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
