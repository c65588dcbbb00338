// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role_enum", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Buyer,
  Seller,
  Caretaker,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub phone_number: String,
  pub role: Role,
  pub address_country: Option<String>,
  pub address_state: Option<String>,
  pub address_city: Option<String>,
  pub address_street: Option<String>,
  pub address_zip_code: Option<String>,
  // Caretaker-specific metadata; null for other roles
  pub bio: Option<String>,
  pub speciality: Option<String>,
  pub services: Option<Vec<String>>,
  /// [{ "service": ..., "price": ... }]
  pub pricing: Option<serde_json::Value>,
  /// [{ "day": ..., "start": ..., "end": ... }]
  pub availability: Option<serde_json::Value>,
  pub is_blocked: bool,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
