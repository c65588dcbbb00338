// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  fn rank(&self) -> u8 {
    match self {
      OrderStatus::Pending => 0,
      OrderStatus::Processing => 1,
      OrderStatus::Shipped => 2,
      OrderStatus::Delivered => 3,
      OrderStatus::Cancelled => 4,
    }
  }

  /// Forward-only transitions; Cancelled is reachable from Pending and
  /// Processing only and is terminal, as is Delivered.
  pub fn can_become(&self, next: OrderStatus) -> bool {
    match (self, next) {
      (OrderStatus::Cancelled, _) | (OrderStatus::Delivered, _) => false,
      (_, OrderStatus::Cancelled) => matches!(self, OrderStatus::Pending | OrderStatus::Processing),
      (from, to) => to.rank() == from.rank() + 1,
    }
  }

  /// Buyers may only cancel, and only before the order ships.
  pub fn cancellable_by_buyer(&self) -> bool {
    self.can_become(OrderStatus::Cancelled)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_method_enum", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
  /// Online payment through the external gateway; requires a token fetch
  /// before the order is persisted.
  Gateway,
  CashOnDelivery,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub buyer_id: Uuid,
  pub items_price: i64,
  pub tax_price: i64,
  pub shipping_price: i64,
  pub total_price: i64,
  pub currency: String,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub paid: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gateway_token: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Immutable line item with the price snapshotted at purchase time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub price_at_purchase: i64,
  pub currency: String,
}

#[cfg(test)]
mod tests {
  use super::OrderStatus::*;

  #[test]
  fn happy_path_is_forward_only() {
    assert!(Pending.can_become(Processing));
    assert!(Processing.can_become(Shipped));
    assert!(Shipped.can_become(Delivered));
  }

  #[test]
  fn no_skipping_or_rewinding() {
    assert!(!Pending.can_become(Shipped));
    assert!(!Pending.can_become(Delivered));
    assert!(!Shipped.can_become(Processing));
    assert!(!Delivered.can_become(Shipped));
    assert!(!Processing.can_become(Pending));
  }

  #[test]
  fn cancellation_only_from_early_states() {
    assert!(Pending.can_become(Cancelled));
    assert!(Processing.can_become(Cancelled));
    assert!(!Shipped.can_become(Cancelled));
    assert!(!Delivered.can_become(Cancelled));
  }

  #[test]
  fn terminal_states_stay_terminal() {
    for next in [Pending, Processing, Shipped, Delivered, Cancelled] {
      assert!(!Cancelled.can_become(next));
      assert!(!Delivered.can_become(next));
    }
  }

  #[test]
  fn buyer_cancellation_window() {
    assert!(Pending.cancellable_by_buyer());
    assert!(Processing.cancellable_by_buyer());
    assert!(!Shipped.cancellable_by_buyer());
    assert!(!Delivered.cancellable_by_buyer());
    assert!(!Cancelled.cancellable_by_buyer());
  }
}
