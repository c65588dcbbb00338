// src/services/orders.rs

//! Order lifecycle: checkout (price snapshot + optional gateway token, one
//! transaction), scoped reads, forward-only status transitions, buyer
//! cancellation.

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItem, OrderStatus, PaymentMethod, Role};
use crate::services::auth::Principal;
use crate::state::AppState;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NewOrderItem {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct NewOrder {
  pub items: Vec<NewOrderItem>,
  pub payment_method: PaymentMethod,
  #[serde(default)]
  pub tax_price: i64,
  #[serde(default)]
  pub shipping_price: i64,
}

#[derive(Debug, serde::Serialize)]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}

/// Places an order. Line items snapshot the current product price; for
/// gateway payment the access token is fetched before anything is written,
/// so an unreachable gateway aborts checkout with no local record. Order and
/// items are inserted in one transaction.
#[instrument(name = "orders::create", skip(state, new), fields(%buyer_id, item_count = new.items.len()))]
pub async fn create(state: &AppState, buyer_id: Uuid, new: NewOrder) -> Result<OrderWithItems> {
  if new.items.is_empty() {
    return Err(AppError::Validation("An order needs at least one line item.".to_string()));
  }
  if new.items.iter().any(|i| i.quantity < 1) {
    return Err(AppError::Validation("Line item quantity must be at least 1.".to_string()));
  }
  if new.tax_price < 0 || new.shipping_price < 0 {
    return Err(AppError::Validation("Price components cannot be negative.".to_string()));
  }

  let product_ids: Vec<Uuid> = new.items.iter().map(|i| i.product_id).collect();
  let rows: Vec<(Uuid, i64, String)> =
    sqlx::query_as("SELECT id, price_amount, price_currency FROM products WHERE id = ANY($1) AND is_deleted = FALSE")
      .bind(&product_ids)
      .fetch_all(&state.db_pool)
      .await?;
  let prices: HashMap<Uuid, (i64, String)> = rows.into_iter().map(|(id, amt, cur)| (id, (amt, cur))).collect();

  let mut items_price: i64 = 0;
  for item in &new.items {
    let (amount, _) = prices
      .get(&item.product_id)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", item.product_id)))?;
    items_price += amount * i64::from(item.quantity);
  }
  let total_price = items_price + new.tax_price + new.shipping_price;

  let order_id = Uuid::new_v4();
  let gateway_token = match new.payment_method {
    PaymentMethod::Gateway => Some(state.payments.access_token(order_id, total_price).await?),
    PaymentMethod::CashOnDelivery => None,
  };

  let mut tx = state.db_pool.begin().await?;

  let order: Order = sqlx::query_as(
    "INSERT INTO orders \
       (id, buyer_id, items_price, tax_price, shipping_price, total_price, currency, \
        status, payment_method, paid, gateway_token) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8, FALSE, $9) \
     RETURNING *",
  )
  .bind(order_id)
  .bind(buyer_id)
  .bind(items_price)
  .bind(new.tax_price)
  .bind(new.shipping_price)
  .bind(total_price)
  .bind(&state.config.default_currency)
  .bind(new.payment_method)
  .bind(&gateway_token)
  .fetch_one(&mut *tx)
  .await?;

  let mut items = Vec::with_capacity(new.items.len());
  for item in &new.items {
    let (amount, currency) = &prices[&item.product_id];
    let line: OrderItem = sqlx::query_as(
      "INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase, currency) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(amount)
    .bind(currency)
    .fetch_one(&mut *tx)
    .await?;
    items.push(line);
  }

  tx.commit().await?;
  info!(%order_id, total_price, "Order placed");

  Ok(OrderWithItems { order, items })
}

fn buyer_bind(principal: &Principal) -> Option<Uuid> {
  match principal.role {
    Role::Buyer => Some(principal.user_id),
    _ => None,
  }
}

/// Buyers see their own orders; sellers and admins see all of them.
#[instrument(name = "orders::list", skip(pool, principal))]
pub async fn list(pool: &PgPool, principal: &Principal, offset: i64, limit: i64) -> Result<(Vec<Order>, i64)> {
  let buyer = buyer_bind(principal);

  let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE ($1::uuid IS NULL OR buyer_id = $1)")
    .bind(buyer)
    .fetch_one(pool)
    .await?;

  let orders: Vec<Order> = sqlx::query_as(
    "SELECT * FROM orders WHERE ($1::uuid IS NULL OR buyer_id = $1) \
     ORDER BY created_at DESC OFFSET $2 LIMIT $3",
  )
  .bind(buyer)
  .bind(offset)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok((orders, total))
}

#[instrument(name = "orders::get", skip(pool, principal), fields(%order_id))]
pub async fn get(pool: &PgPool, principal: &Principal, order_id: Uuid) -> Result<OrderWithItems> {
  let buyer = buyer_bind(principal);

  let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND ($2::uuid IS NULL OR buyer_id = $2)")
    .bind(order_id)
    .bind(buyer)
    .fetch_optional(pool)
    .await?;
  let order = order.ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

  let items: Vec<OrderItem> = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1")
    .bind(order_id)
    .fetch_all(pool)
    .await?;

  Ok(OrderWithItems { order, items })
}

/// Seller/admin status mutation. The transition table is enforced here, not
/// in the handler: pending → processing → shipped → delivered, with
/// cancellation possible from the first two states only.
#[instrument(name = "orders::update_status", skip(pool), fields(%order_id, ?next))]
pub async fn update_status(pool: &PgPool, order_id: Uuid, next: OrderStatus) -> Result<Order> {
  let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1")
    .bind(order_id)
    .fetch_optional(pool)
    .await?;
  let order = order.ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

  if !order.status.can_become(next) {
    return Err(AppError::Policy(format!(
      "Order cannot move from {:?} to {:?}.",
      order.status, next
    )));
  }

  let updated: Order = sqlx::query_as("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *")
    .bind(order_id)
    .bind(next)
    .fetch_one(pool)
    .await?;

  info!("Order status updated");
  Ok(updated)
}

/// Buyer-initiated cancellation of their own order, allowed only while the
/// order has not shipped.
#[instrument(name = "orders::cancel", skip(pool), fields(%buyer_id, %order_id))]
pub async fn cancel(pool: &PgPool, buyer_id: Uuid, order_id: Uuid) -> Result<Order> {
  let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND buyer_id = $2")
    .bind(order_id)
    .bind(buyer_id)
    .fetch_optional(pool)
    .await?;
  let order = order.ok_or_else(|| AppError::NotFound("Order not found.".to_string()))?;

  if !order.status.cancellable_by_buyer() {
    return Err(AppError::Policy(format!(
      "Order in status {:?} can no longer be cancelled.",
      order.status
    )));
  }

  let updated: Order =
    sqlx::query_as("UPDATE orders SET status = 'cancelled', updated_at = NOW() WHERE id = $1 RETURNING *")
      .bind(order_id)
      .fetch_one(pool)
      .await?;

  info!("Order cancelled by buyer");
  Ok(updated)
}
