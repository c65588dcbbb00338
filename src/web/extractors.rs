// src/web/extractors.rs

//! Request-side authentication and the role gate.

use crate::errors::AppError;
use crate::models::Role;
use crate::services::auth::{self, Principal};
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

/// Extracts the authenticated principal from `Authorization: Bearer <token>`
/// by resolving the token against the live sessions. Handlers take this as an
/// argument; an invalid or revoked token never reaches them.
#[derive(Debug)]
pub struct AuthenticatedUser(pub Principal);

fn bearer_token(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get("Authorization")?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, AppError>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

      let token = bearer_token(&req).ok_or_else(|| {
        warn!("Missing or malformed Authorization header.");
        AppError::Auth("Missing or malformed Authorization header.".to_string())
      })?;

      let principal = auth::authenticate_token(&state.db_pool, &token).await?;
      Ok(AuthenticatedUser(principal))
    })
  }
}

/// Pure role gate: the principal's role must be in the allowed set.
pub fn require_role(principal: &Principal, allowed: &[Role]) -> Result<(), AppError> {
  if allowed.contains(&principal.role) {
    Ok(())
  } else {
    Err(AppError::Forbidden("Access denied.".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;
  use uuid::Uuid;

  fn principal(role: Role) -> Principal {
    Principal {
      user_id: Uuid::new_v4(),
      role,
      session_id: Uuid::new_v4(),
    }
  }

  #[test]
  fn role_gate_accepts_any_listed_role() {
    let p = principal(Role::Buyer);
    assert!(require_role(&p, &[Role::Caretaker, Role::Buyer]).is_ok());
    assert!(require_role(&p, &[Role::Buyer]).is_ok());
  }

  #[test]
  fn role_gate_rejects_unlisted_role() {
    let p = principal(Role::Seller);
    let err = require_role(&p, &[Role::Admin, Role::Buyer]).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
  }

  #[test]
  fn bearer_token_parsing() {
    let req = TestRequest::default()
      .insert_header(("Authorization", "Bearer abc123"))
      .to_http_request();
    assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));

    let no_scheme = TestRequest::default()
      .insert_header(("Authorization", "abc123"))
      .to_http_request();
    assert!(bearer_token(&no_scheme).is_none());

    let empty = TestRequest::default()
      .insert_header(("Authorization", "Bearer "))
      .to_http_request();
    assert!(bearer_token(&empty).is_none());

    let absent = TestRequest::default().to_http_request();
    assert!(bearer_token(&absent).is_none());
  }
}
