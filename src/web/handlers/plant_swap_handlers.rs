// src/web/handlers/plant_swap_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::swaps::{self, NewPlantSwap, PlantSwapChanges};
use crate::state::AppState;
use crate::web::envelope::{self, PageQuery, Pagination};
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::create_plant_swap", skip(app_state, auth_user, payload), fields(user_id = %auth_user.0.user_id))]
pub async fn create_plant_swap_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  payload: web::Json<NewPlantSwap>,
) -> Result<HttpResponse, AppError> {
  let swap = swaps::create(&app_state.db_pool, auth_user.0.user_id, payload.into_inner()).await?;
  Ok(envelope::created("Plant swap created successfully.", swap))
}

/// Public listing of open swaps.
#[instrument(name = "handler::list_plant_swaps", skip(app_state, page_query))]
pub async fn list_plant_swaps_handler(
  app_state: web::Data<AppState>,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (items, total) = swaps::list_open(&app_state.db_pool, page_query.offset(), page_query.limit()).await?;
  let pagination = Pagination::new(total, page_query.page(), items.len(), page_query.limit());
  Ok(envelope::ok_paginated(items, pagination))
}

#[instrument(name = "handler::list_my_plant_swaps", skip(app_state, auth_user, page_query), fields(user_id = %auth_user.0.user_id))]
pub async fn list_my_plant_swaps_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (items, total) = swaps::list_for_user(
    &app_state.db_pool,
    auth_user.0.user_id,
    false,
    page_query.offset(),
    page_query.limit(),
  )
  .await?;
  let pagination = Pagination::new(total, page_query.page(), items.len(), page_query.limit());
  Ok(envelope::ok_paginated(items, pagination))
}

#[instrument(name = "handler::list_partner_plant_swaps", skip(app_state, auth_user, page_query), fields(user_id = %auth_user.0.user_id))]
pub async fn list_partner_plant_swaps_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  page_query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let (items, total) = swaps::list_for_user(
    &app_state.db_pool,
    auth_user.0.user_id,
    true,
    page_query.offset(),
    page_query.limit(),
  )
  .await?;
  let pagination = Pagination::new(total, page_query.page(), items.len(), page_query.limit());
  Ok(envelope::ok_paginated(items, pagination))
}

#[instrument(name = "handler::get_plant_swap", skip(app_state), fields(swap_id = %path))]
pub async fn get_plant_swap_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let swap = swaps::get(&app_state.db_pool, path.into_inner()).await?;
  Ok(envelope::ok(swap))
}

#[instrument(name = "handler::update_plant_swap", skip(app_state, auth_user, payload), fields(swap_id = %path))]
pub async fn update_plant_swap_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<PlantSwapChanges>,
) -> Result<HttpResponse, AppError> {
  let swap = swaps::update(
    &app_state.db_pool,
    auth_user.0.user_id,
    path.into_inner(),
    payload.into_inner(),
  )
  .await?;
  Ok(envelope::ok_message("Plant swap updated successfully.", swap))
}

#[instrument(name = "handler::make_plant_swap_deal", skip(app_state, auth_user), fields(swap_id = %path))]
pub async fn make_plant_swap_deal_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let swap = swaps::make_deal(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_message("Plant swap deal made successfully.", swap))
}

#[instrument(name = "handler::delete_plant_swap", skip(app_state, auth_user), fields(swap_id = %path))]
pub async fn delete_plant_swap_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  swaps::delete(&app_state.db_pool, auth_user.0.user_id, path.into_inner()).await?;
  Ok(envelope::ok_empty("Plant swap deleted successfully."))
}
