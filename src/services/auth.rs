// src/services/auth.rs

//! Password hashing/verification and session handling. A signin inserts a
//! session row; signout revokes it; the request extractor resolves a bearer
//! token back to a principal through the live (non-revoked) sessions.

use crate::errors::{AppError, Result};
use crate::models::{Role, Session};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const SESSION_TOKEN_LEN: usize = 48;

/// The authenticated caller as seen by every handler: trusted output of the
/// session lookup, input to the role gate.
#[derive(Debug, Clone)]
pub struct Principal {
  pub user_id: Uuid,
  pub role: Role,
  pub session_id: Uuid,
}

/// Hashes a plain-text password using Argon2 with a random salt.
#[instrument(name = "auth::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let argon2_hasher = Argon2::default();

  match argon2_hasher.hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => Ok(password_hash_obj.to_string()),
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash. A mismatch is
/// `Ok(false)`; only an unparsable hash or an internal argon2 fault errors.
#[instrument(name = "auth::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool> {
  if hashed_password_str.is_empty() || provided_password.is_empty() {
    return Err(AppError::Auth("Invalid credentials.".to_string()));
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification failed.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

fn generate_session_token() -> String {
  rand::thread_rng()
    .sample_iter(&Alphanumeric)
    .take(SESSION_TOKEN_LEN)
    .map(char::from)
    .collect()
}

/// Creates a fresh session for the user and returns it with its token.
#[instrument(name = "auth::issue_session", skip(pool), fields(%user_id))]
pub async fn issue_session(pool: &PgPool, user_id: Uuid) -> Result<Session> {
  let token = generate_session_token();
  let session: Session = sqlx::query_as(
    "INSERT INTO sessions (id, user_id, token, revoked) \
     VALUES ($1, $2, $3, FALSE) \
     RETURNING id, user_id, token, revoked, created_at",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .bind(&token)
  .fetch_one(pool)
  .await?;

  debug!(session_id = %session.id, "Session issued");
  Ok(session)
}

/// Marks a session revoked. Revoking an already-revoked or unknown session is
/// a not-found so a stale client learns its token is gone.
#[instrument(name = "auth::revoke_session", skip(pool), fields(%session_id))]
pub async fn revoke_session(pool: &PgPool, session_id: Uuid) -> Result<()> {
  let result = sqlx::query("UPDATE sessions SET revoked = TRUE WHERE id = $1 AND revoked = FALSE")
    .bind(session_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Session not found or already revoked.".to_string()));
  }
  Ok(())
}

/// Resolves a bearer token to a principal: the session must be live and the
/// user neither deleted nor blocked.
#[instrument(name = "auth::authenticate_token", skip_all)]
pub async fn authenticate_token(pool: &PgPool, token: &str) -> Result<Principal> {
  let row: Option<(Uuid, Uuid, Role)> = sqlx::query_as(
    "SELECT s.id, u.id, u.role FROM sessions s \
     JOIN users u ON u.id = s.user_id \
     WHERE s.token = $1 AND s.revoked = FALSE \
       AND u.is_deleted = FALSE AND u.is_blocked = FALSE",
  )
  .bind(token)
  .fetch_optional(pool)
  .await?;

  match row {
    Some((session_id, user_id, role)) => Ok(Principal {
      user_id,
      role,
      session_id,
    }),
    None => Err(AppError::Auth("Invalid or expired session token.".to_string())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify_roundtrip() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "wrong password").unwrap());
  }

  #[test]
  fn empty_password_is_rejected() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn garbage_stored_hash_is_an_internal_fault() {
    assert!(matches!(
      verify_password("not-an-argon2-hash", "pw"),
      Err(AppError::Internal(_))
    ));
  }

  #[test]
  fn session_tokens_are_long_and_unique() {
    let a = generate_session_token();
    let b = generate_session_token();
    assert_eq!(a.len(), SESSION_TOKEN_LEN);
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
  }
}
