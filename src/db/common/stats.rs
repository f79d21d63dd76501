use crate::db::{DbConnection, DbPool, RepositoryError};
use crate::models::common::ClaimStatus;
use chrono::{Duration, Utc};
use diesel::dsl::{count_distinct, count_star};
use diesel::prelude::*;
use log::error;
use serde::Serialize;
use utoipa::ToSchema;

const ACTIVE_STUDENT_WINDOW_DAYS: i64 = 30;

/// Dashboard rollup. All figures are zero on an empty database.
#[derive(Serialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct MealStats {
    pub total_meals_saved: i64,
    pub active_students: i64,
    pub partner_canteens: i64,
    pub total_savings: f64,
}

#[derive(Clone)]
pub struct StatsOperations {
    pool: DbPool,
}

impl StatsOperations {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_stats(&self) -> Result<MealStats, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("get_stats: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::{food_claims, food_items};

        let total_meals_saved = food_claims::table
            .filter(food_claims::status.eq(ClaimStatus::Claimed))
            .select(count_star())
            .first::<i64>(conn.connection())
            .map_err(|e| {
                error!("get_stats: error counting redeemed claims: {}", e);
                RepositoryError::DatabaseError(e)
            })?;

        let now = Utc::now();
        let since = now - Duration::days(ACTIVE_STUDENT_WINDOW_DAYS);
        let active_students = food_claims::table
            .filter(food_claims::created_at.ge(since))
            .select(count_distinct(food_claims::user_id))
            .first::<i64>(conn.connection())
            .map_err(|e| {
                error!("get_stats: error counting active students: {}", e);
                RepositoryError::DatabaseError(e)
            })?;

        let partner_canteens = food_items::table
            .filter(food_items::is_active.eq(true))
            .filter(food_items::available_until.gt(now))
            .select(count_distinct(food_items::canteen_name))
            .first::<i64>(conn.connection())
            .map_err(|e| {
                error!("get_stats: error counting partner canteens: {}", e);
                RepositoryError::DatabaseError(e)
            })?;

        let redeemed = food_claims::table
            .inner_join(food_items::table)
            .filter(food_claims::status.eq(ClaimStatus::Claimed))
            .select((
                food_items::original_price,
                food_items::discounted_price,
                food_claims::quantity_claimed,
            ))
            .load::<(f64, f64, i32)>(conn.connection())
            .map_err(|e| {
                error!("get_stats: error loading redeemed claims: {}", e);
                RepositoryError::DatabaseError(e)
            })?;

        Ok(MealStats {
            total_meals_saved,
            active_students,
            partner_canteens,
            total_savings: total_savings(&redeemed),
        })
    }
}

fn total_savings(redeemed: &[(f64, f64, i32)]) -> f64 {
    redeemed
        .iter()
        .map(|&(original, discounted, qty)| (original - discounted) * f64::from(qty))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn savings_weighted_by_quantity() {
        let rows = [(80.0, 40.0, 2), (50.0, 25.0, 1)];
        assert_eq!(total_savings(&rows), 105.0);
    }

    #[test]
    fn savings_of_nothing_is_zero() {
        assert_eq!(total_savings(&[]), 0.0);
    }
}
