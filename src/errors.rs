// src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Application error taxonomy. Expected conditions (not-found, conflict,
/// policy violations) travel through this enum as values; only persistence
/// and configuration faults end up as 500s.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Access Denied: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Policy Violation: {0}")]
  Policy(String),

  #[error("Upstream Error: {0}")]
  Upstream(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable identifier carried in every failure envelope so clients can
  /// disambiguate without matching on message strings.
  pub fn identifier(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "0x0A01",
      AppError::Auth(_) => "0x0A02",
      AppError::Forbidden(_) => "0x0A03",
      AppError::NotFound(_) => "0x0A04",
      AppError::Conflict(_) => "0x0A05",
      AppError::Policy(_) => "0x0A06",
      AppError::Upstream(_) => "0x0A07",
      AppError::Sqlx(_) => "0x0A08",
      AppError::Config(_) => "0x0A09",
      AppError::Internal(_) => "0x0A0A",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Policy(_) | AppError::Upstream(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Sqlx(_) | AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  /// Client-facing message. Database and config faults are not echoed back
  /// verbatim; everything else is safe to show.
  fn public_message(&self) -> String {
    match self {
      AppError::Sqlx(_) => "Database operation failed".to_string(),
      AppError::Config(_) => "Configuration issue".to_string(),
      other => other.to_string(),
    }
  }
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in code that uses `?` on anyhow results.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    self.status()
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, identifier = self.identifier(), "Responding with error");
    HttpResponse::build(self.status()).json(json!({
      "status": "FAILED",
      "error": {
        "statusCode": self.status().as_u16(),
        "message": self.public_message(),
        "identifier": self.identifier(),
      }
    }))
  }
}

/// Maps unique/exclusion violations to Conflict so a losing concurrent writer
/// surfaces the same way an availability-check miss does.
pub fn map_constraint_violation(err: sqlx::Error, conflict_message: &str) -> AppError {
  if let sqlx::Error::Database(ref db_err) = err {
    // 23505 = unique_violation, 23P01 = exclusion_violation
    if matches!(db_err.code().as_deref(), Some("23505") | Some("23P01")) {
      return AppError::Conflict(conflict_message.to_string());
    }
  }
  AppError::Sqlx(err)
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_variant_has_a_stable_identifier_and_status() {
    let cases: Vec<(AppError, u16, &str)> = vec![
      (AppError::Validation("v".into()), 400, "0x0A01"),
      (AppError::Auth("a".into()), 401, "0x0A02"),
      (AppError::Forbidden("f".into()), 403, "0x0A03"),
      (AppError::NotFound("n".into()), 404, "0x0A04"),
      (AppError::Conflict("c".into()), 409, "0x0A05"),
      (AppError::Policy("p".into()), 422, "0x0A06"),
      (AppError::Upstream("u".into()), 422, "0x0A07"),
      (AppError::Config("cfg".into()), 500, "0x0A09"),
      (AppError::Internal("i".into()), 500, "0x0A0A"),
    ];
    for (err, code, ident) in cases {
      assert_eq!(err.status().as_u16(), code, "status for {err}");
      assert_eq!(err.identifier(), ident, "identifier for {err}");
    }
  }

  #[test]
  fn database_faults_are_not_echoed_to_clients() {
    let err = AppError::Sqlx(sqlx::Error::PoolClosed);
    assert_eq!(err.public_message(), "Database operation failed");
    assert_eq!(err.identifier(), "0x0A08");
  }

  #[test]
  fn non_constraint_database_errors_stay_internal() {
    let err = map_constraint_violation(sqlx::Error::PoolClosed, "slot taken");
    assert!(matches!(err, AppError::Sqlx(_)));
  }
}
