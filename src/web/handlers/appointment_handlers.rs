// src/web/handlers/appointment_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Role;
use crate::services::appointments::{self, AppointmentChanges, AppointmentWindow, NewAppointment};
use crate::state::AppState;
use crate::web::envelope::{self, PageQuery, Pagination};
use crate::web::extractors::{require_role, AuthenticatedUser};

#[derive(Debug, serde::Deserialize)]
pub struct AppointmentListQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
  pub start: Option<chrono::DateTime<chrono::Utc>>,
  pub end: Option<chrono::DateTime<chrono::Utc>>,
}

/// Books a caretaker. The response carries both the created appointment and
/// the gateway form parameters the client needs to finish paying.
#[instrument(name = "handler::create_appointment", skip(app_state, auth_user, payload), fields(user_id = %auth_user.0.user_id))]
pub async fn create_appointment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewAppointment>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;

  let (appointment, form_params) =
    appointments::create(&app_state, auth_user.0.user_id, payload.into_inner()).await?;

  Ok(envelope::created(
    "Appointment created successfully.",
    json!({ "appointment": appointment, "formParams": form_params }),
  ))
}

#[instrument(name = "handler::list_appointments", skip(app_state, auth_user, query), fields(user_id = %auth_user.0.user_id))]
pub async fn list_appointments_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<AppointmentListQuery>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer, Role::Caretaker, Role::Admin])?;

  let page = PageQuery {
    page: query.page,
    limit: query.limit,
  };
  let window = AppointmentWindow {
    start: query.start,
    end: query.end,
  };

  let (items, total) = appointments::list(&app_state.db_pool, &auth_user.0, &window, page.offset(), page.limit()).await?;

  let pagination = Pagination::new(total, page.page(), items.len(), page.limit());
  Ok(envelope::ok_paginated(items, pagination))
}

#[instrument(name = "handler::get_appointment", skip(app_state, auth_user), fields(appointment_id = %path))]
pub async fn get_appointment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer, Role::Caretaker, Role::Admin])?;

  let appointment = appointments::get(&app_state.db_pool, &auth_user.0, path.into_inner()).await?;
  Ok(envelope::ok(appointment))
}

#[instrument(name = "handler::update_appointment", skip(app_state, auth_user, payload), fields(appointment_id = %path))]
pub async fn update_appointment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<AppointmentChanges>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer, Role::Caretaker])?;

  let appointment = appointments::update(
    &app_state.db_pool,
    &auth_user.0,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;

  Ok(envelope::ok_message("Appointment updated successfully.", appointment))
}

#[instrument(name = "handler::delete_appointment", skip(app_state, auth_user), fields(appointment_id = %path))]
pub async fn delete_appointment_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  require_role(&auth_user.0, &[Role::Buyer])?;

  appointments::delete(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_empty("Appointment deleted successfully."))
}
