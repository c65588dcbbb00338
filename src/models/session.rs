// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One row per signin. Logout flips `revoked` instead of deleting the row or
/// nulling a column on the user, so old tokens stay auditable.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
  pub id: Uuid,
  pub user_id: Uuid,
  #[serde(skip_serializing)]
  pub token: String,
  pub revoked: bool,
  pub created_at: DateTime<Utc>,
}
