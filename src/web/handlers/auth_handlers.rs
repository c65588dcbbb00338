// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{map_constraint_violation, AppError};
use crate::models::{Role, User};
use crate::services::auth;
use crate::state::AppState;
use crate::web::envelope;
use crate::web::extractors::AuthenticatedUser;

// --- Request DTOs ---

#[derive(Deserialize, Debug)]
pub struct SignupRequestPayload {
  pub first_name: String,
  pub last_name: String,
  pub email: String,
  pub password: String,
  pub phone_number: String,
  pub role: Option<Role>,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

fn validate_signup(payload: &SignupRequestPayload) -> Result<(), AppError> {
  if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
    return Err(AppError::Validation("First and last name are required.".to_string()));
  }
  if !payload.email.contains('@') {
    return Err(AppError::Validation("A valid email address is required.".to_string()));
  }
  if payload.password.len() < 8 {
    return Err(AppError::Validation(
      "Password must be at least 8 characters.".to_string(),
    ));
  }
  if payload.phone_number.trim().is_empty() {
    return Err(AppError::Validation("A phone number is required.".to_string()));
  }
  if payload.role == Some(Role::Admin) {
    return Err(AppError::Validation("Cannot self-register as admin.".to_string()));
  }
  Ok(())
}

// --- Handler Implementations ---

#[instrument(name = "handler::signup", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse, AppError> {
  validate_signup(&req_payload)?;
  let email = req_payload.email.trim().to_lowercase();

  let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1 AND is_deleted = FALSE")
    .bind(&email)
    .fetch_optional(&app_state.db_pool)
    .await?;
  if existing.is_some() {
    return Err(AppError::Conflict("Email is already registered.".to_string()));
  }

  let password_hash = auth::hash_password(&req_payload.password)?;
  let role = req_payload.role.unwrap_or(Role::Buyer);

  let user: User = sqlx::query_as(
    "INSERT INTO users (id, first_name, last_name, email, password_hash, phone_number, role) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(req_payload.first_name.trim())
  .bind(req_payload.last_name.trim())
  .bind(&email)
  .bind(&password_hash)
  .bind(req_payload.phone_number.trim())
  .bind(role)
  .fetch_one(&app_state.db_pool)
  .await
  .map_err(|e| map_constraint_violation(e, "Email is already registered."))?;

  info!(user_id = %user.id, "User signed up");
  Ok(envelope::created("User created successfully.", user))
}

#[instrument(name = "handler::signin", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let email = req_payload.email.trim().to_lowercase();

  let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1 AND is_deleted = FALSE")
    .bind(&email)
    .fetch_optional(&app_state.db_pool)
    .await?;

  let user = match user {
    Some(u) => u,
    None => {
      warn!("Signin attempt for unknown email");
      return Err(AppError::Auth("Invalid email or password.".to_string()));
    }
  };

  if !auth::verify_password(&user.password_hash, &req_payload.password)? {
    return Err(AppError::Auth("Invalid email or password.".to_string()));
  }
  if user.is_blocked {
    return Err(AppError::Forbidden("This account has been blocked.".to_string()));
  }

  let session = auth::issue_session(&app_state.db_pool, user.id).await?;

  info!(user_id = %user.id, "Signin successful");
  Ok(envelope::ok_message(
    "Signin successful.",
    json!({ "token": session.token, "user": user }),
  ))
}

#[instrument(name = "handler::signout", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn signout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth::revoke_session(&app_state.db_pool, auth_user.0.session_id).await?;
  Ok(envelope::ok_empty("Signed out successfully."))
}

#[instrument(name = "handler::me", skip(app_state, auth_user), fields(user_id = %auth_user.0.user_id))]
pub async fn me_handler(app_state: web::Data<AppState>, auth_user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
    .bind(auth_user.0.user_id)
    .fetch_optional(&app_state.db_pool)
    .await?;

  let user = user.ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  Ok(envelope::ok(user))
}
