// src/services/reviews.rs

//! Reviews as owned child collections: product reviews keyed by
//! (product, reviewer, order), caretaker reviews keyed by
//! (caretaker, reviewer). Duplicates are pre-checked for a clean Conflict and
//! backed by partial unique indexes for the racing case.

use crate::errors::{map_constraint_violation, AppError, Result};
use crate::models::{CaretakerReview, ProductReview};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

const DUPLICATE_PRODUCT_REVIEW: &str = "You have already reviewed this product for this order.";
const DUPLICATE_CARETAKER_REVIEW: &str = "You have already reviewed this caretaker.";

#[derive(Debug, Deserialize)]
pub struct NewReview {
  pub rating: i16,
  pub comment: String,
  /// Order the product review is tied to, when the purchase is known.
  pub order_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewChanges {
  pub rating: Option<i16>,
  pub comment: Option<String>,
}

fn validate_rating(rating: i16) -> Result<()> {
  if !(1..=5).contains(&rating) {
    return Err(AppError::Validation("Rating must be between 1 and 5.".to_string()));
  }
  Ok(())
}

#[instrument(name = "reviews::create_product_review", skip(pool, new), fields(%reviewer_id, %product_id))]
pub async fn create_product_review(
  pool: &PgPool,
  reviewer_id: Uuid,
  product_id: Uuid,
  new: NewReview,
) -> Result<ProductReview> {
  validate_rating(new.rating)?;

  let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 AND is_deleted = FALSE")
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
  if product.is_none() {
    return Err(AppError::NotFound("Product not found.".to_string()));
  }

  // The order reference, when given, must be the reviewer's own purchase.
  if let Some(order_id) = new.order_id {
    let order: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM orders WHERE id = $1 AND buyer_id = $2")
      .bind(order_id)
      .bind(reviewer_id)
      .fetch_optional(pool)
      .await?;
    if order.is_none() {
      return Err(AppError::NotFound("Order not found.".to_string()));
    }
  }

  let duplicate: Option<(Uuid,)> = sqlx::query_as(
    "SELECT id FROM product_reviews \
     WHERE product_id = $1 AND reviewer_id = $2 \
       AND order_id IS NOT DISTINCT FROM $3 AND is_deleted = FALSE",
  )
  .bind(product_id)
  .bind(reviewer_id)
  .bind(new.order_id)
  .fetch_optional(pool)
  .await?;
  if duplicate.is_some() {
    return Err(AppError::Conflict(DUPLICATE_PRODUCT_REVIEW.to_string()));
  }

  let review: ProductReview = sqlx::query_as(
    "INSERT INTO product_reviews (id, product_id, reviewer_id, order_id, rating, comment) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(product_id)
  .bind(reviewer_id)
  .bind(new.order_id)
  .bind(new.rating)
  .bind(&new.comment)
  .fetch_one(pool)
  .await
  .map_err(|e| map_constraint_violation(e, DUPLICATE_PRODUCT_REVIEW))?;

  info!(review_id = %review.id, "Product review created");
  Ok(review)
}

#[instrument(name = "reviews::list_product_reviews", skip(pool), fields(%product_id))]
pub async fn list_product_reviews(pool: &PgPool, product_id: Uuid) -> Result<Vec<ProductReview>> {
  let reviews: Vec<ProductReview> = sqlx::query_as(
    "SELECT * FROM product_reviews WHERE product_id = $1 AND is_deleted = FALSE ORDER BY created_at DESC",
  )
  .bind(product_id)
  .fetch_all(pool)
  .await?;
  Ok(reviews)
}

/// Updating the existing review is the supported alternative to posting a
/// duplicate; only the author can do it.
#[instrument(name = "reviews::update_product_review", skip(pool, changes), fields(%reviewer_id, %review_id))]
pub async fn update_product_review(
  pool: &PgPool,
  reviewer_id: Uuid,
  review_id: Uuid,
  changes: ReviewChanges,
) -> Result<ProductReview> {
  let existing: Option<ProductReview> =
    sqlx::query_as("SELECT * FROM product_reviews WHERE id = $1 AND reviewer_id = $2 AND is_deleted = FALSE")
      .bind(review_id)
      .bind(reviewer_id)
      .fetch_optional(pool)
      .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

  let rating = changes.rating.unwrap_or(existing.rating);
  validate_rating(rating)?;
  let comment = changes.comment.unwrap_or(existing.comment);

  let updated: ProductReview = sqlx::query_as(
    "UPDATE product_reviews SET rating = $2, comment = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
  )
  .bind(review_id)
  .bind(rating)
  .bind(&comment)
  .fetch_one(pool)
  .await?;

  Ok(updated)
}

#[instrument(name = "reviews::delete_product_review", skip(pool), fields(%reviewer_id, %review_id))]
pub async fn delete_product_review(pool: &PgPool, reviewer_id: Uuid, review_id: Uuid) -> Result<()> {
  let result = sqlx::query(
    "UPDATE product_reviews SET is_deleted = TRUE, updated_at = NOW() \
     WHERE id = $1 AND reviewer_id = $2 AND is_deleted = FALSE",
  )
  .bind(review_id)
  .bind(reviewer_id)
  .execute(pool)
  .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Review not found.".to_string()));
  }
  Ok(())
}

#[instrument(name = "reviews::create_caretaker_review", skip(pool, new), fields(%reviewer_id, %caretaker_id))]
pub async fn create_caretaker_review(
  pool: &PgPool,
  reviewer_id: Uuid,
  caretaker_id: Uuid,
  new: NewReview,
) -> Result<CaretakerReview> {
  validate_rating(new.rating)?;

  let caretaker: Option<(Uuid,)> =
    sqlx::query_as("SELECT id FROM users WHERE id = $1 AND role = 'caretaker' AND is_deleted = FALSE")
      .bind(caretaker_id)
      .fetch_optional(pool)
      .await?;
  if caretaker.is_none() {
    return Err(AppError::Policy("You can only review caretakers.".to_string()));
  }

  let duplicate: Option<(Uuid,)> = sqlx::query_as(
    "SELECT id FROM caretaker_reviews \
     WHERE caretaker_id = $1 AND reviewer_id = $2 AND is_deleted = FALSE",
  )
  .bind(caretaker_id)
  .bind(reviewer_id)
  .fetch_optional(pool)
  .await?;
  if duplicate.is_some() {
    return Err(AppError::Conflict(DUPLICATE_CARETAKER_REVIEW.to_string()));
  }

  let review: CaretakerReview = sqlx::query_as(
    "INSERT INTO caretaker_reviews (id, caretaker_id, reviewer_id, rating, comment) \
     VALUES ($1, $2, $3, $4, $5) \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(caretaker_id)
  .bind(reviewer_id)
  .bind(new.rating)
  .bind(&new.comment)
  .fetch_one(pool)
  .await
  .map_err(|e| map_constraint_violation(e, DUPLICATE_CARETAKER_REVIEW))?;

  info!(review_id = %review.id, "Caretaker review created");
  Ok(review)
}

#[instrument(name = "reviews::list_caretaker_reviews", skip(pool), fields(%caretaker_id))]
pub async fn list_caretaker_reviews(pool: &PgPool, caretaker_id: Uuid) -> Result<Vec<CaretakerReview>> {
  let reviews: Vec<CaretakerReview> = sqlx::query_as(
    "SELECT * FROM caretaker_reviews WHERE caretaker_id = $1 AND is_deleted = FALSE ORDER BY created_at DESC",
  )
  .bind(caretaker_id)
  .fetch_all(pool)
  .await?;
  Ok(reviews)
}

#[instrument(name = "reviews::update_caretaker_review", skip(pool, changes), fields(%reviewer_id, %review_id))]
pub async fn update_caretaker_review(
  pool: &PgPool,
  reviewer_id: Uuid,
  review_id: Uuid,
  changes: ReviewChanges,
) -> Result<CaretakerReview> {
  let existing: Option<CaretakerReview> =
    sqlx::query_as("SELECT * FROM caretaker_reviews WHERE id = $1 AND reviewer_id = $2 AND is_deleted = FALSE")
      .bind(review_id)
      .bind(reviewer_id)
      .fetch_optional(pool)
      .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Review not found.".to_string()))?;

  let rating = changes.rating.unwrap_or(existing.rating);
  validate_rating(rating)?;
  let comment = changes.comment.unwrap_or(existing.comment);

  let updated: CaretakerReview = sqlx::query_as(
    "UPDATE caretaker_reviews SET rating = $2, comment = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
  )
  .bind(review_id)
  .bind(rating)
  .bind(&comment)
  .fetch_one(pool)
  .await?;

  Ok(updated)
}

#[instrument(name = "reviews::delete_caretaker_review", skip(pool), fields(%reviewer_id, %review_id))]
pub async fn delete_caretaker_review(pool: &PgPool, reviewer_id: Uuid, review_id: Uuid) -> Result<()> {
  let result = sqlx::query(
    "UPDATE caretaker_reviews SET is_deleted = TRUE, updated_at = NOW() \
     WHERE id = $1 AND reviewer_id = $2 AND is_deleted = FALSE",
  )
  .bind(review_id)
  .bind(reviewer_id)
  .execute(pool)
  .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Review not found.".to_string()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rating_bounds() {
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
    for r in 1..=5 {
      assert!(validate_rating(r).is_ok());
    }
  }
}
