// src/models/plant_swap.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "swap_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
  Pending,
  Completed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlantSwap {
  pub id: Uuid,
  pub user_id: Uuid,
  pub swap_partner_id: Option<Uuid>,
  pub offered_plants: Vec<Uuid>,
  pub desired_plants: Vec<Uuid>,
  pub status: SwapStatus,
  #[serde(skip_serializing)]
  pub is_deleted: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl PlantSwap {
  /// Completed swaps are frozen: no field mutation, no deal, no deletion,
  /// regardless of caller.
  pub fn is_frozen(&self) -> bool {
    matches!(self.status, SwapStatus::Completed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn swap(status: SwapStatus) -> PlantSwap {
    PlantSwap {
      id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      swap_partner_id: None,
      offered_plants: vec![Uuid::new_v4()],
      desired_plants: vec![Uuid::new_v4()],
      status,
      is_deleted: false,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn completed_swaps_are_frozen() {
    assert!(swap(SwapStatus::Completed).is_frozen());
    assert!(!swap(SwapStatus::Pending).is_frozen());
  }

  #[test]
  fn soft_delete_flag_is_not_serialized() {
    let value = serde_json::to_value(swap(SwapStatus::Pending)).unwrap();
    assert!(value.get("is_deleted").is_none());
    assert_eq!(value["status"], "PENDING");
  }
}
