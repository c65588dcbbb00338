// src/services/availability.rs

//! Interval-overlap query that keeps a caretaker from being double-booked.

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Checks whether `[start, end)` is free for the caretaker.
///
/// Any non-rejected, non-deleted appointment with `start_at < end AND
/// end_at > start` occupies the slot; touching endpoints do not conflict.
/// `exclude` skips the record's own id when re-checking during an update.
///
/// Read-only and idempotent. A legitimate overlap comes back as
/// `AppError::Conflict`; only a database fault escalates further. The insert
/// path is additionally backed by a storage-level exclusion constraint, so a
/// writer that races past this check still fails with the same Conflict.
#[instrument(
  name = "availability::check",
  skip(pool),
  fields(caretaker_id = %caretaker_id, %start, %end, exclude = ?exclude)
)]
pub async fn check_availability(
  pool: &PgPool,
  caretaker_id: Uuid,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  exclude: Option<Uuid>,
) -> Result<()> {
  if start >= end {
    return Err(AppError::Validation(
      "Appointment start must be before its end.".to_string(),
    ));
  }

  let conflicting: Option<(Uuid,)> = sqlx::query_as(
    "SELECT id FROM appointments \
     WHERE caretaker_id = $1 \
       AND status <> 'rejected' \
       AND is_deleted = FALSE \
       AND start_at < $3 \
       AND end_at > $2 \
       AND ($4::uuid IS NULL OR id <> $4) \
     LIMIT 1",
  )
  .bind(caretaker_id)
  .bind(start)
  .bind(end)
  .bind(exclude)
  .fetch_optional(pool)
  .await?;

  match conflicting {
    Some((appointment_id,)) => {
      debug!(%appointment_id, "Slot already taken");
      Err(AppError::Conflict("Appointment slot not available.".to_string()))
    }
    None => Ok(()),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};

  // Mirror of the WHERE clause above (`start_at < end AND end_at > start`)
  // so the half-open boundary semantics are pinned down in one place.
  fn occupies(
    existing: (DateTime<Utc>, DateTime<Utc>),
    requested: (DateTime<Utc>, DateTime<Utc>),
  ) -> bool {
    existing.0 < requested.1 && existing.1 > requested.0
  }

  fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, min, 0).unwrap()
  }

  #[test]
  fn touching_endpoints_never_conflict() {
    // [10:00, 11:00) then [11:00, 12:00)
    assert!(!occupies((at(10, 0), at(11, 0)), (at(11, 0), at(12, 0))));
    assert!(!occupies((at(11, 0), at(12, 0)), (at(10, 0), at(11, 0))));
  }

  #[test]
  fn partial_overlap_conflicts() {
    // [10:00, 11:00) vs [10:30, 11:30)
    assert!(occupies((at(10, 0), at(11, 0)), (at(10, 30), at(11, 30))));
  }

  #[test]
  fn containment_conflicts() {
    assert!(occupies((at(9, 0), at(12, 0)), (at(10, 0), at(11, 0))));
    assert!(occupies((at(10, 0), at(11, 0)), (at(9, 0), at(12, 0))));
  }

  #[test]
  fn disjoint_intervals_do_not_conflict() {
    assert!(!occupies((at(8, 0), at(9, 0)), (at(10, 0), at(11, 0))));
  }
}
