// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Product, Role};
use crate::services::reviews;
use crate::state::AppState;
use crate::web::envelope::{self, PageQuery, Pagination};
use crate::web::extractors::{require_role, AuthenticatedUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct CreateProductPayload {
  pub name: String,
  #[serde(default)]
  pub categories: Vec<String>,
  #[serde(default)]
  pub srcs: Vec<String>,
  pub short_desc: String,
  pub long_desc: String,
  pub price_amount: i64,
  pub pot_size: Option<i32>,
  pub pot_unit: Option<String>,
  pub pot_type: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateProductPayload {
  pub name: Option<String>,
  pub categories: Option<Vec<String>>,
  pub srcs: Option<Vec<String>>,
  pub short_desc: Option<String>,
  pub long_desc: Option<String>,
  pub price_amount: Option<i64>,
  pub pot_size: Option<i32>,
  pub pot_unit: Option<String>,
  pub pot_type: Option<String>,
}

// --- Handlers ---

#[instrument(name = "handler::list_products", skip(app_state, page_query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE is_deleted = FALSE")
    .fetch_one(&app_state.db_pool)
    .await?;

  let products: Vec<Product> = sqlx::query_as(
    "SELECT * FROM products WHERE is_deleted = FALSE ORDER BY name ASC OFFSET $1 LIMIT $2",
  )
  .bind(page_query.offset())
  .bind(page_query.limit())
  .fetch_all(&app_state.db_pool)
  .await?;

  let pagination = Pagination::new(total, page_query.page(), products.len(), page_query.limit());
  Ok(envelope::ok_paginated(products, pagination))
}

#[instrument(name = "handler::get_product", skip(app_state), fields(product_id = %path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();

  let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1 AND is_deleted = FALSE")
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;

  let product = product.ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  Ok(envelope::ok(product))
}

#[instrument(name = "handler::create_product", skip(app_state, auth_user, payload), fields(user_id = %auth_user.0.user_id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin, Role::Seller])?;

  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Product name is required.".to_string()));
  }
  if payload.price_amount <= 0 {
    return Err(AppError::Validation("Product price must be positive.".to_string()));
  }

  let product: Product = sqlx::query_as(
    "INSERT INTO products \
       (id, name, categories, srcs, short_desc, long_desc, price_amount, price_currency, \
        pot_size, pot_unit, pot_type, seller_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(payload.name.trim())
  .bind(&payload.categories)
  .bind(&payload.srcs)
  .bind(&payload.short_desc)
  .bind(&payload.long_desc)
  .bind(payload.price_amount)
  .bind(&app_state.config.default_currency)
  .bind(payload.pot_size)
  .bind(&payload.pot_unit)
  .bind(&payload.pot_type)
  .bind(auth_user.0.user_id)
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(product_id = %product.id, "Product created");
  Ok(envelope::created("Product created successfully.", product))
}

/// Ownership is folded into the filter: a seller updating someone else's
/// product sees not-found, not forbidden. Admins may touch any product.
#[instrument(name = "handler::update_product", skip(app_state, auth_user, payload), fields(product_id = %path))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin, Role::Seller])?;
  let product_id = path.into_inner();
  let owner = match auth_user.0.role {
    Role::Admin => None,
    _ => Some(auth_user.0.user_id),
  };

  let existing: Option<Product> = sqlx::query_as(
    "SELECT * FROM products WHERE id = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR seller_id = $2)",
  )
  .bind(product_id)
  .bind(owner)
  .fetch_optional(&app_state.db_pool)
  .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

  let p = payload.into_inner();
  let price_amount = p.price_amount.unwrap_or(existing.price_amount);
  if price_amount <= 0 {
    return Err(AppError::Validation("Product price must be positive.".to_string()));
  }

  let updated: Product = sqlx::query_as(
    "UPDATE products SET \
       name = $2, categories = $3, srcs = $4, short_desc = $5, long_desc = $6, \
       price_amount = $7, pot_size = $8, pot_unit = $9, pot_type = $10, updated_at = NOW() \
     WHERE id = $1 \
     RETURNING *",
  )
  .bind(product_id)
  .bind(p.name.unwrap_or(existing.name))
  .bind(p.categories.unwrap_or(existing.categories))
  .bind(p.srcs.unwrap_or(existing.srcs))
  .bind(p.short_desc.unwrap_or(existing.short_desc))
  .bind(p.long_desc.unwrap_or(existing.long_desc))
  .bind(price_amount)
  .bind(p.pot_size.or(existing.pot_size))
  .bind(p.pot_unit.or(existing.pot_unit))
  .bind(p.pot_type.or(existing.pot_type))
  .fetch_one(&app_state.db_pool)
  .await?;

  Ok(envelope::ok_message("Product updated successfully.", updated))
}

#[instrument(name = "handler::delete_product", skip(app_state, auth_user), fields(product_id = %path))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin, Role::Seller])?;
  let owner = match auth_user.0.role {
    Role::Admin => None,
    _ => Some(auth_user.0.user_id),
  };

  let result = sqlx::query(
    "UPDATE products SET is_deleted = TRUE, updated_at = NOW() \
     WHERE id = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR seller_id = $2)",
  )
  .bind(path.into_inner())
  .bind(owner)
  .execute(&app_state.db_pool)
  .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Product not found.".to_string()));
  }
  Ok(envelope::ok_empty("Product deleted successfully."))
}

// --- Product reviews ---

#[instrument(name = "handler::create_product_review", skip(app_state, auth_user, payload), fields(product_id = %path))]
pub async fn create_product_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<reviews::NewReview>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;
  let review = reviews::create_product_review(
    &app_state.db_pool,
    auth_user.0.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(envelope::created("Review created successfully.", review))
}

#[instrument(name = "handler::list_product_reviews", skip(app_state), fields(product_id = %path))]
pub async fn list_product_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let all = reviews::list_product_reviews(&app_state.db_pool, path.into_inner()).await?;
  Ok(envelope::ok(all))
}

#[instrument(name = "handler::update_product_review", skip(app_state, auth_user, payload), fields(review_id = %path))]
pub async fn update_product_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<reviews::ReviewChanges>,
) -> Result<HttpResponse, AppError> {
  let review = reviews::update_product_review(
    &app_state.db_pool,
    auth_user.0.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(envelope::ok_message("Review updated successfully.", review))
}

#[instrument(name = "handler::delete_product_review", skip(app_state, auth_user), fields(review_id = %path))]
pub async fn delete_product_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  reviews::delete_product_review(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_empty("Review deleted successfully."))
}
