mod common;

use campus_meals::db::{
    ClaimOperations, DbConnection, FoodOperations, MealStats, StatsOperations,
    DEFAULT_MIN_ITEM_QUANTITY, RESERVATION_WINDOW_SECS,
};
use campus_meals::models::food::UpdateFoodItem;
use campus_meals::test_utils::set_available_until;
use chrono::{Duration, Utc};

#[test]
fn empty_database_reports_zeroes() {
    let pool = common::setup_pool();
    let stats_ops = StatsOperations::new(pool);

    assert_eq!(stats_ops.get_stats().expect("stats"), MealStats::default());
}

#[test]
fn redeemed_claims_drive_meals_and_savings() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let claim_ops = ClaimOperations::new(pool.clone(), RESERVATION_WINDOW_SECS);
    let stats_ops = StatsOperations::new(pool.clone());

    let before = stats_ops.get_stats().expect("stats");
    assert_eq!(before.total_meals_saved, 0);
    assert_eq!(before.active_students, 0);
    assert_eq!(before.partner_canteens, 2);

    // Veg Thali: 80 -> 40, two portions redeemed.
    let redeemed = claim_ops
        .reserve_food(fixtures.student_id, fixtures.food_item_ids[0], 2)
        .expect("reserve");
    claim_ops.complete_claim(redeemed.claim_id).expect("complete");
    // Still reserved, counts towards activity only.
    claim_ops
        .reserve_food(fixtures.other_student_id, fixtures.food_item_ids[2], 1)
        .expect("reserve");

    let after = stats_ops.get_stats().expect("stats");
    assert_eq!(after.total_meals_saved, 1);
    assert_eq!(after.active_students, 2);
    assert!((after.total_savings - 80.0).abs() < 1e-9);
}

#[test]
fn partner_canteens_count_distinct_active_canteens() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let food_ops = FoodOperations::new(pool.clone(), DEFAULT_MIN_ITEM_QUANTITY);
    let stats_ops = StatsOperations::new(pool);

    food_ops
        .update_food_item(
            fixtures.food_item_ids[2],
            UpdateFoodItem {
                canteen_name: Some("North Canteen".to_string()),
                ..Default::default()
            },
        )
        .expect("move item");

    assert_eq!(stats_ops.get_stats().expect("stats").partner_canteens, 1);
}

#[test]
fn lapsed_items_stop_counting_before_any_sweep() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let stats_ops = StatsOperations::new(pool.clone());
    assert_eq!(stats_ops.get_stats().expect("stats").partner_canteens, 2);

    // South Canteen only lists Idli Sambar.
    {
        let mut conn = DbConnection::new(&pool).expect("db connection");
        set_available_until(
            conn.connection(),
            fixtures.food_item_ids[2],
            Utc::now() - Duration::minutes(5),
        )
        .expect("lapse item");
    }

    assert_eq!(stats_ops.get_stats().expect("stats").partner_canteens, 1);
}
