//! Recomputes the `is_active` flag of food items from the wall clock.
//!
//! The sweep is idempotent and runs inline before every catalog read and
//! before the donation transfer. It can also be driven on a timer by
//! `services::expiry_sweeper`.

use crate::db::RepositoryError;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not};
use diesel::prelude::*;
use diesel::PgConnection;
use log::{debug, error};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub deactivated: usize,
    pub reactivated: usize,
}

/// Deactivates every active item whose deadline has passed and reactivates
/// inactive items whose deadline was pushed back and still have portions left,
/// unless their leftovers were already transferred to a donation.
pub fn reconcile_item_status(
    conn: &mut PgConnection,
    now: DateTime<Utc>,
) -> Result<SweepOutcome, RepositoryError> {
    use crate::db::schema::food_donations;
    use crate::db::schema::food_items::dsl::*;

    let deactivated = diesel::update(
        food_items
            .filter(is_active.eq(true))
            .filter(available_until.lt(now)),
    )
    .set((is_active.eq(false), updated_at.eq(now)))
    .execute(conn)
    .map_err(|e| {
        error!("reconcile_item_status: error deactivating expired items: {}", e);
        RepositoryError::DatabaseError(e)
    })?;

    let reactivated = diesel::update(
        food_items
            .filter(is_active.eq(false))
            .filter(available_until.ge(now))
            .filter(quantity_available.ge(1))
            .filter(not(exists(
                food_donations::table.filter(food_donations::food_id.eq(food_id)),
            ))),
    )
    .set((is_active.eq(true), updated_at.eq(now)))
    .execute(conn)
    .map_err(|e| {
        error!("reconcile_item_status: error reactivating extended items: {}", e);
        RepositoryError::DatabaseError(e)
    })?;

    if deactivated > 0 || reactivated > 0 {
        debug!(
            "reconcile_item_status: deactivated {} and reactivated {} items",
            deactivated, reactivated
        );
    }

    Ok(SweepOutcome {
        deactivated,
        reactivated,
    })
}
