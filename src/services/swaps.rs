// src/services/swaps.rs

//! Plant swap lifecycle. Completed swaps are frozen for everyone; the deal
//! itself is a single conditional update so two would-be partners cannot both
//! win.

use crate::errors::{AppError, Result};
use crate::models::PlantSwap;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

// Every mutating statement repeats the pending-status check so a deal that
// commits between our read and our write hits zero rows instead of rewriting
// a completed swap.
const UPDATE_SWAP_SQL: &str = "UPDATE plant_swaps \
   SET offered_plants = $2, desired_plants = $3, updated_at = NOW() \
   WHERE id = $1 AND status = 'pending' AND is_deleted = FALSE \
   RETURNING *";

const DELETE_SWAP_SQL: &str = "UPDATE plant_swaps \
   SET is_deleted = TRUE, updated_at = NOW() \
   WHERE id = $1 AND status = 'pending' AND is_deleted = FALSE";

const MAKE_DEAL_SQL: &str = "UPDATE plant_swaps \
   SET swap_partner_id = $2, status = 'completed', updated_at = NOW() \
   WHERE id = $1 AND status = 'pending' AND is_deleted = FALSE \
   RETURNING *";

#[derive(Debug, Deserialize)]
pub struct NewPlantSwap {
  pub offered_plants: Vec<Uuid>,
  pub desired_plants: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlantSwapChanges {
  pub offered_plants: Option<Vec<Uuid>>,
  pub desired_plants: Option<Vec<Uuid>>,
}

fn validate_plant_lists(offered: &[Uuid], desired: &[Uuid]) -> Result<()> {
  if offered.is_empty() || desired.is_empty() {
    return Err(AppError::Validation(
      "A swap needs at least one offered and one desired plant.".to_string(),
    ));
  }
  if offered.iter().any(|p| desired.contains(p)) {
    return Err(AppError::Validation(
      "Offered and desired plants must not overlap.".to_string(),
    ));
  }
  Ok(())
}

#[instrument(name = "swaps::create", skip(pool, new), fields(%user_id))]
pub async fn create(pool: &PgPool, user_id: Uuid, new: NewPlantSwap) -> Result<PlantSwap> {
  validate_plant_lists(&new.offered_plants, &new.desired_plants)?;

  let swap: PlantSwap = sqlx::query_as(
    "INSERT INTO plant_swaps (id, user_id, offered_plants, desired_plants, status) \
     VALUES ($1, $2, $3, $4, 'pending') \
     RETURNING *",
  )
  .bind(Uuid::new_v4())
  .bind(user_id)
  .bind(&new.offered_plants)
  .bind(&new.desired_plants)
  .fetch_one(pool)
  .await?;

  info!(swap_id = %swap.id, "Plant swap created");
  Ok(swap)
}

/// Open (pending) swaps, visible to everyone.
#[instrument(name = "swaps::list_open", skip(pool))]
pub async fn list_open(pool: &PgPool, offset: i64, limit: i64) -> Result<(Vec<PlantSwap>, i64)> {
  let (total,): (i64,) =
    sqlx::query_as("SELECT COUNT(*) FROM plant_swaps WHERE status = 'pending' AND is_deleted = FALSE")
      .fetch_one(pool)
      .await?;

  let swaps: Vec<PlantSwap> = sqlx::query_as(
    "SELECT * FROM plant_swaps WHERE status = 'pending' AND is_deleted = FALSE \
     ORDER BY created_at DESC OFFSET $1 LIMIT $2",
  )
  .bind(offset)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok((swaps, total))
}

/// The caller's swaps, either as creator or as the partner who made a deal.
#[instrument(name = "swaps::list_for_user", skip(pool))]
pub async fn list_for_user(
  pool: &PgPool,
  user_id: Uuid,
  as_partner: bool,
  offset: i64,
  limit: i64,
) -> Result<(Vec<PlantSwap>, i64)> {
  let column = if as_partner { "swap_partner_id" } else { "user_id" };

  let (total,): (i64,) = sqlx::query_as(&format!(
    "SELECT COUNT(*) FROM plant_swaps WHERE {column} = $1 AND is_deleted = FALSE"
  ))
  .bind(user_id)
  .fetch_one(pool)
  .await?;

  let swaps: Vec<PlantSwap> = sqlx::query_as(&format!(
    "SELECT * FROM plant_swaps WHERE {column} = $1 AND is_deleted = FALSE \
     ORDER BY created_at DESC OFFSET $2 LIMIT $3"
  ))
  .bind(user_id)
  .bind(offset)
  .bind(limit)
  .fetch_all(pool)
  .await?;

  Ok((swaps, total))
}

#[instrument(name = "swaps::get", skip(pool), fields(%swap_id))]
pub async fn get(pool: &PgPool, swap_id: Uuid) -> Result<PlantSwap> {
  let swap: Option<PlantSwap> = sqlx::query_as("SELECT * FROM plant_swaps WHERE id = $1 AND is_deleted = FALSE")
    .bind(swap_id)
    .fetch_optional(pool)
    .await?;

  swap.ok_or_else(|| AppError::NotFound("Plant swap not found.".to_string()))
}

/// Creator-only field updates, refused once the swap is completed. The write
/// itself is conditional on the swap still being pending, so a deal landing
/// after our read cannot be overwritten.
#[instrument(name = "swaps::update", skip(pool, changes), fields(%user_id, %swap_id))]
pub async fn update(pool: &PgPool, user_id: Uuid, swap_id: Uuid, changes: PlantSwapChanges) -> Result<PlantSwap> {
  let existing: Option<PlantSwap> =
    sqlx::query_as("SELECT * FROM plant_swaps WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE")
      .bind(swap_id)
      .bind(user_id)
      .fetch_optional(pool)
      .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Plant swap not found.".to_string()))?;

  if existing.is_frozen() {
    return Err(AppError::Policy("Cannot update a completed plant swap.".to_string()));
  }

  let offered = changes.offered_plants.unwrap_or(existing.offered_plants);
  let desired = changes.desired_plants.unwrap_or(existing.desired_plants);
  validate_plant_lists(&offered, &desired)?;

  let updated: Option<PlantSwap> = sqlx::query_as(UPDATE_SWAP_SQL)
    .bind(swap_id)
    .bind(&offered)
    .bind(&desired)
    .fetch_optional(pool)
    .await?;

  updated.ok_or_else(|| AppError::Policy("Cannot update a completed plant swap.".to_string()))
}

/// Accepts a pending swap: atomically sets the partner and flips the status
/// to completed. The `status = 'pending'` guard in the UPDATE means a lost
/// race (or an already-completed swap) affects zero rows and surfaces as the
/// same policy violation.
#[instrument(name = "swaps::make_deal", skip(pool), fields(%partner_id, %swap_id))]
pub async fn make_deal(pool: &PgPool, partner_id: Uuid, swap_id: Uuid) -> Result<PlantSwap> {
  let existing = get(pool, swap_id).await?;

  if existing.is_frozen() {
    return Err(AppError::Policy(
      "Cannot make a deal on a completed plant swap.".to_string(),
    ));
  }
  if existing.user_id == partner_id {
    return Err(AppError::Policy("Cannot make a deal on your own plant swap.".to_string()));
  }

  let updated: Option<PlantSwap> = sqlx::query_as(MAKE_DEAL_SQL)
    .bind(swap_id)
    .bind(partner_id)
    .fetch_optional(pool)
    .await?;

  match updated {
    Some(swap) => {
      info!("Plant swap deal made");
      Ok(swap)
    }
    None => Err(AppError::Policy(
      "Plant swap was completed by someone else first.".to_string(),
    )),
  }
}

/// Creator-only soft delete, allowed only while the swap is pending. Like
/// `update`, the delete statement re-checks the status so a concurrent deal
/// cannot be erased.
#[instrument(name = "swaps::delete", skip(pool), fields(%user_id, %swap_id))]
pub async fn delete(pool: &PgPool, user_id: Uuid, swap_id: Uuid) -> Result<()> {
  let existing: Option<PlantSwap> =
    sqlx::query_as("SELECT * FROM plant_swaps WHERE id = $1 AND user_id = $2 AND is_deleted = FALSE")
      .bind(swap_id)
      .bind(user_id)
      .fetch_optional(pool)
      .await?;
  let existing = existing.ok_or_else(|| AppError::NotFound("Plant swap not found.".to_string()))?;

  if existing.is_frozen() {
    return Err(AppError::Policy("Cannot delete a completed plant swap.".to_string()));
  }

  let result = sqlx::query(DELETE_SWAP_SQL).bind(swap_id).execute(pool).await?;
  if result.rows_affected() == 0 {
    return Err(AppError::Policy("Cannot delete a completed plant swap.".to_string()));
  }

  info!("Plant swap soft-deleted");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_plant_lists_are_rejected() {
    let a = Uuid::new_v4();
    assert!(validate_plant_lists(&[], &[a]).is_err());
    assert!(validate_plant_lists(&[a], &[]).is_err());
  }

  #[test]
  fn overlapping_plant_lists_are_rejected() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert!(validate_plant_lists(&[a, b], &[b]).is_err());
  }

  #[test]
  fn disjoint_non_empty_lists_pass() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    assert!(validate_plant_lists(&[a], &[b]).is_ok());
  }

  // A deal can land between a creator's read and write; every mutating
  // statement must therefore carry its own pending-status condition rather
  // than rely on the pre-check.
  #[test]
  fn swap_mutations_are_conditional_on_pending_status() {
    for sql in [UPDATE_SWAP_SQL, DELETE_SWAP_SQL, MAKE_DEAL_SQL] {
      assert!(sql.contains("status = 'pending'"), "unguarded statement: {sql}");
      assert!(sql.contains("is_deleted = FALSE"), "unguarded statement: {sql}");
    }
  }
}
