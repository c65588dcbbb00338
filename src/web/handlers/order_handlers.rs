// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderStatus, Role};
use crate::services::orders::{self, NewOrder};
use crate::state::AppState;
use crate::web::envelope::{self, PageQuery, Pagination};
use crate::web::extractors::{require_role, AuthenticatedUser};

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::create_order", skip(app_state, auth_user, payload), fields(user_id = %auth_user.0.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewOrder>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;

  let order = orders::create(&app_state, auth_user.0.user_id, payload.into_inner()).await?;
  Ok(envelope::created("Order placed successfully.", order))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user, page_query), fields(user_id = %auth_user.0.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer, Role::Seller, Role::Admin])?;

  let (items, total) = orders::list(
    &app_state.db_pool,
    &auth_user.0,
    page_query.offset(),
    page_query.limit(),
  )
  .await?;

  let pagination = Pagination::new(total, page_query.page(), items.len(), page_query.limit());
  Ok(envelope::ok_paginated(items, pagination))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(order_id = %path))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer, Role::Seller, Role::Admin])?;

  let order = orders::get(&app_state.db_pool, &auth_user.0, path.into_inner()).await?;
  Ok(envelope::ok(order))
}

#[instrument(name = "handler::update_order_status", skip(app_state, auth_user, payload), fields(order_id = %path))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateOrderStatusPayload>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Seller, Role::Admin])?;

  let order = orders::update_status(&app_state.db_pool, path.into_inner(), payload.status).await?;
  Ok(envelope::ok_message("Order status updated successfully.", order))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user), fields(order_id = %path))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;

  let order = orders::cancel(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_message("Order cancelled successfully.", order))
}
