// src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{CaretakerReview, Role, User};
use crate::services::reviews;
use crate::state::AppState;
use crate::web::envelope::{self, PageQuery, Pagination};
use crate::web::extractors::{require_role, AuthenticatedUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
pub struct UpdateProfilePayload {
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub phone_number: Option<String>,
  pub address_country: Option<String>,
  pub address_state: Option<String>,
  pub address_city: Option<String>,
  pub address_street: Option<String>,
  pub address_zip_code: Option<String>,
  // Caretaker profile fields
  pub bio: Option<String>,
  pub speciality: Option<String>,
  pub services: Option<Vec<String>>,
  pub pricing: Option<serde_json::Value>,
  pub availability: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct BlockPayload {
  pub blocked: bool,
}

// --- Handlers ---

/// Public caretaker directory, paginated.
#[instrument(name = "handler::list_caretakers", skip(app_state, page_query))]
pub async fn list_caretakers_handler(
  app_state: web::Data<AppState>,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (total,): (i64,) =
    sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'caretaker' AND is_deleted = FALSE AND is_blocked = FALSE")
      .fetch_one(&app_state.db_pool)
      .await?;

  let caretakers: Vec<User> = sqlx::query_as(
    "SELECT * FROM users \
     WHERE role = 'caretaker' AND is_deleted = FALSE AND is_blocked = FALSE \
     ORDER BY first_name, last_name OFFSET $1 LIMIT $2",
  )
  .bind(page_query.offset())
  .bind(page_query.limit())
  .fetch_all(&app_state.db_pool)
  .await?;

  let pagination = Pagination::new(total, page_query.page(), caretakers.len(), page_query.limit());
  Ok(envelope::ok_paginated(caretakers, pagination))
}

fn caretaker_profile(caretaker: User, reviews: Vec<CaretakerReview>) -> serde_json::Value {
  json!({ "caretaker": caretaker, "reviews": reviews })
}

/// Public caretaker profile: metadata (bio, services, pricing, availability)
/// plus reviews. Blocked and deleted caretakers are invisible.
#[instrument(name = "handler::get_caretaker", skip(app_state), fields(caretaker_id = %path))]
pub async fn get_caretaker_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let caretaker_id = path.into_inner();

  let caretaker: Option<User> = sqlx::query_as(
    "SELECT * FROM users \
     WHERE id = $1 AND role = 'caretaker' AND is_deleted = FALSE AND is_blocked = FALSE",
  )
  .bind(caretaker_id)
  .fetch_optional(&app_state.db_pool)
  .await?;
  let caretaker = caretaker.ok_or_else(|| AppError::NotFound("Caretaker not found.".to_string()))?;

  let all_reviews = reviews::list_caretaker_reviews(&app_state.db_pool, caretaker_id).await?;
  Ok(envelope::ok(caretaker_profile(caretaker, all_reviews)))
}

/// Admin-only listing of every live account.
#[instrument(name = "handler::list_users", skip(app_state, auth_user, page_query), fields(user_id = %auth_user.0.user_id))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin])?;

  let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_deleted = FALSE")
    .fetch_one(&app_state.db_pool)
    .await?;

  let users: Vec<User> = sqlx::query_as(
    "SELECT * FROM users WHERE is_deleted = FALSE \
     ORDER BY created_at DESC OFFSET $1 LIMIT $2",
  )
  .bind(page_query.offset())
  .bind(page_query.limit())
  .fetch_all(&app_state.db_pool)
  .await?;

  let pagination = Pagination::new(total, page_query.page(), users.len(), page_query.limit());
  Ok(envelope::ok_paginated(users, pagination))
}

#[instrument(name = "handler::get_user", skip(app_state, auth_user), fields(target = %path))]
pub async fn get_user_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin])?;

  let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
    .bind(path.into_inner())
    .fetch_optional(&app_state.db_pool)
    .await?;

  let user = user.ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  Ok(envelope::ok(user))
}

#[instrument(name = "handler::update_profile", skip(app_state, auth_user, payload), fields(user_id = %auth_user.0.user_id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<UpdateProfilePayload>,
) -> Result<HttpResponse, AppError> {
  let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
    .bind(auth_user.0.user_id)
    .fetch_optional(&app_state.db_pool)
    .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

  let p = payload.into_inner();
  let updated: User = sqlx::query_as(
    "UPDATE users SET \
       first_name = $2, last_name = $3, phone_number = $4, \
       address_country = $5, address_state = $6, address_city = $7, \
       address_street = $8, address_zip_code = $9, \
       bio = $10, speciality = $11, services = $12, pricing = $13, availability = $14, \
       updated_at = NOW() \
     WHERE id = $1 \
     RETURNING *",
  )
  .bind(existing.id)
  .bind(p.first_name.unwrap_or(existing.first_name))
  .bind(p.last_name.unwrap_or(existing.last_name))
  .bind(p.phone_number.unwrap_or(existing.phone_number))
  .bind(p.address_country.or(existing.address_country))
  .bind(p.address_state.or(existing.address_state))
  .bind(p.address_city.or(existing.address_city))
  .bind(p.address_street.or(existing.address_street))
  .bind(p.address_zip_code.or(existing.address_zip_code))
  .bind(p.bio.or(existing.bio))
  .bind(p.speciality.or(existing.speciality))
  .bind(p.services.or(existing.services))
  .bind(p.pricing.or(existing.pricing))
  .bind(p.availability.or(existing.availability))
  .fetch_one(&app_state.db_pool)
  .await?;

  Ok(envelope::ok_message("Profile updated successfully.", updated))
}

/// Admin block/unblock. Blocking also cuts off every live session through the
/// extractor's `is_blocked` filter.
#[instrument(name = "handler::set_user_blocked", skip(app_state, auth_user, payload), fields(target = %path))]
pub async fn set_user_blocked_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<BlockPayload>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Admin])?;
  let user_id = path.into_inner();

  let updated: Option<User> = sqlx::query_as(
    "UPDATE users SET is_blocked = $2, updated_at = NOW() \
     WHERE id = $1 AND is_deleted = FALSE \
     RETURNING *",
  )
  .bind(user_id)
  .bind(payload.blocked)
  .fetch_optional(&app_state.db_pool)
  .await?;

  let updated = updated.ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  info!(blocked = payload.blocked, "User block flag updated");
  Ok(envelope::ok_message("User updated successfully.", updated))
}

// --- Caretaker reviews ---

#[instrument(name = "handler::create_caretaker_review", skip(app_state, auth_user, payload), fields(caretaker_id = %path))]
pub async fn create_caretaker_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<reviews::NewReview>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;
  let review = reviews::create_caretaker_review(
    &app_state.db_pool,
    auth_user.0.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(envelope::created("Review created successfully.", review))
}

#[instrument(name = "handler::list_caretaker_reviews", skip(app_state), fields(caretaker_id = %path))]
pub async fn list_caretaker_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let all = reviews::list_caretaker_reviews(&app_state.db_pool, path.into_inner()).await?;
  Ok(envelope::ok(all))
}

#[instrument(name = "handler::update_caretaker_review", skip(app_state, auth_user, payload), fields(review_id = %path))]
pub async fn update_caretaker_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<reviews::ReviewChanges>,
) -> Result<HttpResponse, AppError> {
  let review = reviews::update_caretaker_review(
    &app_state.db_pool,
    auth_user.0.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(envelope::ok_message("Review updated successfully.", review))
}

#[instrument(name = "handler::delete_caretaker_review", skip(app_state, auth_user), fields(review_id = %path))]
pub async fn delete_caretaker_review_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  reviews::delete_caretaker_review(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_empty("Review deleted successfully."))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  #[test]
  fn caretaker_profile_carries_reviews_and_hides_credentials() {
    let caretaker_id = Uuid::new_v4();
    let caretaker = User {
      id: caretaker_id,
      first_name: "Fern".into(),
      last_name: "Gully".into(),
      email: "fern@example.com".into(),
      password_hash: "argon2-hash".into(),
      phone_number: "0300".into(),
      role: Role::Caretaker,
      address_country: None,
      address_state: None,
      address_city: None,
      address_street: None,
      address_zip_code: None,
      bio: Some("Succulent specialist".into()),
      speciality: None,
      services: Some(vec!["repotting".into()]),
      pricing: None,
      availability: None,
      is_blocked: false,
      is_deleted: false,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let review = CaretakerReview {
      id: Uuid::new_v4(),
      caretaker_id,
      reviewer_id: Uuid::new_v4(),
      rating: 5,
      comment: "Great with cacti.".into(),
      is_deleted: false,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };

    let value = caretaker_profile(caretaker, vec![review]);
    assert_eq!(value["caretaker"]["bio"], "Succulent specialist");
    assert!(value["caretaker"].get("password_hash").is_none());
    assert_eq!(value["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(value["reviews"][0]["rating"], 5);
  }
}
