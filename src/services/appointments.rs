// src/services/appointments.rs

//! Appointment lifecycle: create (availability check + payment token before
//! the insert), ownership-scoped reads, guarded updates, soft delete.

use crate::errors::{map_constraint_violation, AppError, Result};
use crate::models::{Appointment, AppointmentStatus, Role};
use crate::services::auth::Principal;
use crate::services::availability::check_availability;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

const SLOT_TAKEN: &str = "Appointment slot not available.";

// The customer-facing writes repeat the approved-status check so a caretaker
// approval committing between our read and our write hits zero rows instead
// of mutating a locked appointment. The caretaker bind lifts the guard for
// the role that is allowed past it.
const UPDATE_APPOINTMENT_SQL: &str = "UPDATE appointments \
   SET start_at = $2, end_at = $3, price_amount = $4, status = $5, updated_at = NOW() \
   WHERE id = $1 AND is_deleted = FALSE AND ($6::boolean OR status <> 'approved') \
   RETURNING *";

const DELETE_APPOINTMENT_SQL: &str = "UPDATE appointments \
   SET is_deleted = TRUE, updated_at = NOW() \
   WHERE id = $1 AND is_deleted = FALSE AND status <> 'approved'";

#[derive(Debug, Deserialize)]
pub struct NewAppointment {
  pub caretaker_id: Uuid,
  pub start_at: DateTime<Utc>,
  pub end_at: DateTime<Utc>,
  pub price_amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentChanges {
  pub start_at: Option<DateTime<Utc>>,
  pub end_at: Option<DateTime<Utc>>,
  pub price_amount: Option<i64>,
  pub status: Option<AppointmentStatus>,
}

/// Parameters the client posts to the gateway's hosted checkout form.
#[derive(Debug, Serialize)]
pub struct PaymentFormParams {
  #[serde(rename = "MERCHANT_ID")]
  pub merchant_id: String,
  #[serde(rename = "MERCHANT_NAME")]
  pub merchant_name: String,
  #[serde(rename = "TOKEN")]
  pub token: String,
  #[serde(rename = "PROCCODE")]
  pub proccode: String,
  #[serde(rename = "TXNAMT")]
  pub amount: i64,
  #[serde(rename = "CURRENCY_CODE")]
  pub currency_code: String,
  #[serde(rename = "BASKET_ID")]
  pub basket_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentWindow {
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
}

/// Ownership scoping per role: buyers see their own bookings, caretakers
/// their own calendar, admins everything. Folding ownership into the filter
/// makes cross-tenant access indistinguishable from not-found.
fn ownership_binds(principal: &Principal) -> (Option<Uuid>, Option<Uuid>) {
  match principal.role {
    Role::Buyer => (Some(principal.user_id), None),
    Role::Caretaker => (None, Some(principal.user_id)),
    _ => (None, None),
  }
}

/// Books a caretaker. Order of operations matters: availability first, then
/// the gateway token (an upstream failure must abort before anything is
/// persisted), then the insert. The insert itself can still lose a race with
/// a concurrent booking; the exclusion constraint turns that into the same
/// Conflict the availability check would have produced.
#[instrument(name = "appointments::create", skip(state, new), fields(customer_id = %customer_id, caretaker_id = %new.caretaker_id))]
pub async fn create(
  state: &AppState,
  customer_id: Uuid,
  new: NewAppointment,
) -> Result<(Appointment, PaymentFormParams)> {
  if new.price_amount <= 0 {
    return Err(AppError::Validation("Appointment price must be positive.".to_string()));
  }

  let caretaker: Option<(Uuid,)> =
    sqlx::query_as("SELECT id FROM users WHERE id = $1 AND role = 'caretaker' AND is_deleted = FALSE")
      .bind(new.caretaker_id)
      .fetch_optional(&state.db_pool)
      .await?;
  if caretaker.is_none() {
    return Err(AppError::NotFound("Caretaker not found.".to_string()));
  }

  check_availability(&state.db_pool, new.caretaker_id, new.start_at, new.end_at, None).await?;

  let appointment_id = Uuid::new_v4();
  let token = state.payments.access_token(appointment_id, new.price_amount).await?;

  let appointment: Appointment = sqlx::query_as(
    "INSERT INTO appointments \
       (id, customer_id, caretaker_id, start_at, end_at, price_amount, price_currency, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending') \
     RETURNING *",
  )
  .bind(appointment_id)
  .bind(customer_id)
  .bind(new.caretaker_id)
  .bind(new.start_at)
  .bind(new.end_at)
  .bind(new.price_amount)
  .bind(&state.config.default_currency)
  .fetch_one(&state.db_pool)
  .await
  .map_err(|e| map_constraint_violation(e, SLOT_TAKEN))?;

  info!(appointment_id = %appointment.id, "Appointment created");

  let form_params = PaymentFormParams {
    merchant_id: state.config.payment_merchant_id.clone(),
    merchant_name: state.config.payment_merchant_name.clone(),
    token,
    proccode: "00".to_string(),
    amount: new.price_amount,
    currency_code: state.config.default_currency.clone(),
    basket_id: appointment_id,
  };

  Ok((appointment, form_params))
}

/// Paginated, start-sorted listing scoped to the caller, with an optional
/// time window.
#[instrument(name = "appointments::list", skip(pool, principal, window))]
pub async fn list(
  pool: &PgPool,
  principal: &Principal,
  window: &AppointmentWindow,
  offset: i64,
  limit: i64,
) -> Result<(Vec<Appointment>, i64)> {
  let (customer, caretaker) = ownership_binds(principal);

  let (total,): (i64,) = sqlx::query_as(
    "SELECT COUNT(*) FROM appointments \
     WHERE is_deleted = FALSE \
       AND ($1::uuid IS NULL OR customer_id = $1) \
       AND ($2::uuid IS NULL OR caretaker_id = $2) \
       AND ($3::timestamptz IS NULL OR start_at >= $3) \
       AND ($4::timestamptz IS NULL OR end_at <= $4)",
  )
  .bind(customer)
  .bind(caretaker)
  .bind(window.start)
  .bind(window.end)
  .fetch_one(pool)
  .await?;

  let appointments: Vec<Appointment> = sqlx::query_as(
    "SELECT * FROM appointments \
     WHERE is_deleted = FALSE \
       AND ($1::uuid IS NULL OR customer_id = $1) \
       AND ($2::uuid IS NULL OR caretaker_id = $2) \
       AND ($3::timestamptz IS NULL OR start_at >= $3) \
       AND ($4::timestamptz IS NULL OR end_at <= $4) \
     ORDER BY start_at ASC \
     OFFSET $5 LIMIT $6",
  )
  .bind(customer)
  .bind(caretaker)
  .bind(window.start)
  .bind(window.end)
  .bind(offset)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok((appointments, total))
}

#[instrument(name = "appointments::get", skip(pool, principal), fields(%appointment_id))]
pub async fn get(pool: &PgPool, principal: &Principal, appointment_id: Uuid) -> Result<Appointment> {
  let (customer, caretaker) = ownership_binds(principal);

  let appointment: Option<Appointment> = sqlx::query_as(
    "SELECT * FROM appointments \
     WHERE id = $1 AND is_deleted = FALSE \
       AND ($2::uuid IS NULL OR customer_id = $2) \
       AND ($3::uuid IS NULL OR caretaker_id = $3)",
  )
  .bind(appointment_id)
  .bind(customer)
  .bind(caretaker)
  .fetch_optional(pool)
  .await?;

  appointment.ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))
}

/// Applies changes under the lifecycle guards:
/// - a buyer cannot touch an approved appointment (policy violation);
/// - only the caretaker may change the status;
/// - moving `start`/`end` re-runs the availability check (excluding this
///   record) and resets the status to pending, re-opening approval.
///
/// For non-caretakers the UPDATE re-checks the approved lock, so an approval
/// committing after our read leaves zero rows and surfaces as the same policy
/// violation.
#[instrument(name = "appointments::update", skip(pool, principal, changes), fields(%appointment_id))]
pub async fn update(
  pool: &PgPool,
  principal: &Principal,
  appointment_id: Uuid,
  changes: AppointmentChanges,
) -> Result<Appointment> {
  let existing = get(pool, principal, appointment_id).await?;

  if principal.role != Role::Caretaker && existing.status.locked_for_customer() {
    return Err(AppError::Policy(
      "Appointment is already approved and cannot be updated.".to_string(),
    ));
  }
  if changes.status.is_some() && principal.role != Role::Caretaker {
    return Err(AppError::Forbidden(
      "Only the caretaker may change the appointment status.".to_string(),
    ));
  }

  let times_changed = changes.start_at.is_some() || changes.end_at.is_some();
  let start_at = changes.start_at.unwrap_or(existing.start_at);
  let end_at = changes.end_at.unwrap_or(existing.end_at);
  let price_amount = changes.price_amount.unwrap_or(existing.price_amount);
  if price_amount <= 0 {
    return Err(AppError::Validation("Appointment price must be positive.".to_string()));
  }

  // A moved interval needs the caretaker's approval again.
  let status = if times_changed {
    check_availability(pool, existing.caretaker_id, start_at, end_at, Some(appointment_id)).await?;
    AppointmentStatus::Pending
  } else {
    changes.status.unwrap_or(existing.status)
  };

  let is_caretaker = principal.role == Role::Caretaker;
  let updated: Option<Appointment> = sqlx::query_as(UPDATE_APPOINTMENT_SQL)
    .bind(appointment_id)
    .bind(start_at)
    .bind(end_at)
    .bind(price_amount)
    .bind(status)
    .bind(is_caretaker)
    .fetch_optional(pool)
    .await
    .map_err(|e| map_constraint_violation(e, SLOT_TAKEN))?;

  updated.ok_or_else(|| {
    if is_caretaker {
      AppError::NotFound("Appointment not found.".to_string())
    } else {
      AppError::Policy("Appointment is already approved and cannot be updated.".to_string())
    }
  })
}

/// Soft-deletes the buyer's own appointment. An approved appointment is
/// locked; the policy error is distinct from not-found on purpose.
#[instrument(name = "appointments::delete", skip(pool), fields(%customer_id, %appointment_id))]
pub async fn delete(pool: &PgPool, customer_id: Uuid, appointment_id: Uuid) -> Result<()> {
  let existing: Option<Appointment> =
    sqlx::query_as("SELECT * FROM appointments WHERE id = $1 AND customer_id = $2 AND is_deleted = FALSE")
      .bind(appointment_id)
      .bind(customer_id)
      .fetch_optional(pool)
      .await?;

  let existing = existing.ok_or_else(|| AppError::NotFound("Appointment not found.".to_string()))?;
  if existing.status.locked_for_customer() {
    return Err(AppError::Policy(
      "Appointment is already approved and cannot be deleted.".to_string(),
    ));
  }

  let result = sqlx::query(DELETE_APPOINTMENT_SQL).bind(appointment_id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(AppError::Policy(
      "Appointment is already approved and cannot be deleted.".to_string(),
    ));
  }

  info!("Appointment soft-deleted");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn form_params_serialize_with_gateway_field_names() {
    let basket = Uuid::new_v4();
    let params = PaymentFormParams {
      merchant_id: "M1".into(),
      merchant_name: "Verdant Market".into(),
      token: "tok".into(),
      proccode: "00".into(),
      amount: 2500,
      currency_code: "PKR".into(),
      basket_id: basket,
    };
    let value = serde_json::to_value(&params).unwrap();
    assert_eq!(value["MERCHANT_ID"], "M1");
    assert_eq!(value["TOKEN"], "tok");
    assert_eq!(value["PROCCODE"], "00");
    assert_eq!(value["TXNAMT"], 2500);
    assert_eq!(value["CURRENCY_CODE"], "PKR");
    assert_eq!(value["BASKET_ID"], basket.to_string());
  }

  #[test]
  fn ownership_scope_follows_role() {
    let principal = |role| Principal {
      user_id: Uuid::new_v4(),
      role,
      session_id: Uuid::new_v4(),
    };

    let buyer = principal(Role::Buyer);
    assert_eq!(ownership_binds(&buyer), (Some(buyer.user_id), None));

    let caretaker = principal(Role::Caretaker);
    assert_eq!(ownership_binds(&caretaker), (None, Some(caretaker.user_id)));

    let admin = principal(Role::Admin);
    assert_eq!(ownership_binds(&admin), (None, None));
  }

  // An approval can commit between a customer's read and write; the write
  // statements must re-check the status themselves.
  #[test]
  fn customer_writes_re_check_the_approved_lock() {
    assert!(UPDATE_APPOINTMENT_SQL.contains("status <> 'approved'"));
    assert!(DELETE_APPOINTMENT_SQL.contains("status <> 'approved'"));
    assert!(DELETE_APPOINTMENT_SQL.contains("is_deleted = FALSE"));
  }
}
