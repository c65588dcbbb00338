// src/models/appointment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "appointment_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
  Pending,
  Approved,
  Rejected,
}

impl AppointmentStatus {
  /// Approved appointments are locked against buyer-initiated edits and
  /// deletion; the caretaker can still change the status.
  pub fn locked_for_customer(&self) -> bool {
    matches!(self, AppointmentStatus::Approved)
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub caretaker_id: Uuid,
  pub start_at: DateTime<Utc>,
  pub end_at: DateTime<Utc>,
  pub price_amount: i64,
  pub price_currency: String,
  pub status: AppointmentStatus,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_approved_is_locked_for_customer() {
    assert!(AppointmentStatus::Approved.locked_for_customer());
    assert!(!AppointmentStatus::Pending.locked_for_customer());
    assert!(!AppointmentStatus::Rejected.locked_for_customer());
  }
}
