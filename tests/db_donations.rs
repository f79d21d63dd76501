mod common;

use campus_meals::db::{
    ClaimOperations, DbConnection, DbPool, DonationOperations, FoodOperations, RepositoryError,
    DEFAULT_MIN_ITEM_QUANTITY, RESERVATION_WINDOW_SECS,
};
use campus_meals::models::common::DonationStatus;
use campus_meals::models::donation::NgoReservation;
use campus_meals::models::food::UpdateFoodItem;
use campus_meals::test_utils::{set_available_until, TestFixtures};
use chrono::{Duration, Utc};

fn lapse(pool: &DbPool, item_id: i32) {
    let mut conn = DbConnection::new(pool).expect("db connection");
    set_available_until(conn.connection(), item_id, Utc::now() - Duration::minutes(10))
        .expect("lapse item");
}

fn ngo() -> NgoReservation {
    NgoReservation {
        ngo_name: "Feeding Hands".to_string(),
        ngo_contact: "Latha".to_string(),
        ngo_phone: "+91 98450 12345".to_string(),
    }
}

/// Lapses both items of the first staff member and returns the donation of
/// the first one.
fn transferred_donation(pool: &DbPool, fixtures: &TestFixtures) -> i32 {
    lapse(pool, fixtures.food_item_ids[0]);
    lapse(pool, fixtures.food_item_ids[1]);
    let donation_ops = DonationOperations::new(pool.clone());
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 2);
    donation_ops
        .list_all_donations()
        .expect("list")
        .into_iter()
        .find(|d| d.food.food_id == fixtures.food_item_ids[0])
        .expect("donation for first item")
        .donation
        .donation_id
}

#[test]
fn transfer_moves_leftovers_once() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    let food_ops = FoodOperations::new(pool.clone(), DEFAULT_MIN_ITEM_QUANTITY);

    // Nothing has lapsed yet.
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 0);

    lapse(&pool, fixtures.food_item_ids[0]);
    food_ops
        .update_food_item(
            fixtures.food_item_ids[1],
            UpdateFoodItem {
                quantity_available: Some(0),
                ..Default::default()
            },
        )
        .expect("sell out");
    lapse(&pool, fixtures.food_item_ids[1]);

    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 1);
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer again"), 0);

    let all = donation_ops.list_all_donations().expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].food.food_id, fixtures.food_item_ids[0]);
    assert_eq!(all[0].donation.quantity_donated, 5);
    assert_eq!(all[0].donation.status, DonationStatus::Available);
    assert!(!all[0].food.is_active);
}

#[test]
fn reserve_then_collect() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    let donation_id = transferred_donation(&pool, &fixtures);

    let reserved = donation_ops
        .reserve_for_ngo(donation_id, &ngo())
        .expect("reserve");
    assert_eq!(reserved.status, DonationStatus::ReservedForNgo);
    assert_eq!(reserved.ngo_name.as_deref(), Some("Feeding Hands"));
    assert!(reserved.reserved_at.is_some());

    assert!(matches!(
        donation_ops.reserve_for_ngo(donation_id, &ngo()),
        Err(RepositoryError::WrongState(_, _))
    ));

    let collected = donation_ops.mark_collected(donation_id).expect("collect");
    assert_eq!(collected.status, DonationStatus::Collected);
    assert!(collected.collected_at.is_some());

    assert!(matches!(
        donation_ops.mark_collected(donation_id),
        Err(RepositoryError::WrongState(_, _))
    ));
}

#[test]
fn reserve_requires_all_ngo_fields() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    let donation_id = transferred_donation(&pool, &fixtures);

    let mut missing_phone = ngo();
    missing_phone.ngo_phone = "  ".to_string();
    let err = donation_ops
        .reserve_for_ngo(donation_id, &missing_phone)
        .expect_err("empty phone");
    assert!(matches!(err, RepositoryError::ValidationError(ref m) if m.contains("ngo_phone")));

    let untouched = donation_ops.get_donation(donation_id).expect("get");
    assert_eq!(untouched.status, DonationStatus::Available);
    assert!(untouched.ngo_name.is_none());
}

#[test]
fn collect_requires_ngo_reservation() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    let donation_id = transferred_donation(&pool, &fixtures);

    assert!(matches!(
        donation_ops.mark_collected(donation_id),
        Err(RepositoryError::WrongState(_, _))
    ));
    assert!(matches!(
        donation_ops.mark_collected(777),
        Err(RepositoryError::NotFound(_))
    ));
    assert!(matches!(
        donation_ops.reserve_for_ngo(777, &ngo()),
        Err(RepositoryError::NotFound(_))
    ));
}

#[test]
fn list_by_creator_filters_on_item_owner() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    transferred_donation(&pool, &fixtures);

    assert_eq!(
        donation_ops
            .list_donations_by_creator(fixtures.staff_id)
            .expect("mine")
            .len(),
        2
    );
    assert!(donation_ops
        .list_donations_by_creator(fixtures.other_staff_id)
        .expect("theirs")
        .is_empty());
}

#[test]
fn cancel_after_transfer_returns_portions_to_donation() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let claim_ops = ClaimOperations::new(pool.clone(), RESERVATION_WINDOW_SECS);
    let donation_ops = DonationOperations::new(pool.clone());
    let food_ops = FoodOperations::new(pool.clone(), DEFAULT_MIN_ITEM_QUANTITY);
    let item_id = fixtures.food_item_ids[0];

    let claim = claim_ops
        .reserve_food(fixtures.student_id, item_id, 2)
        .expect("reserve");
    lapse(&pool, item_id);
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 1);

    claim_ops
        .cancel_claim(claim.claim_id, fixtures.student_id)
        .expect("cancel");

    let donation = donation_ops
        .list_all_donations()
        .expect("list")
        .into_iter()
        .find(|d| d.food.food_id == item_id)
        .expect("donation");
    assert_eq!(donation.donation.quantity_donated, 5);
    assert_eq!(
        food_ops.get_food_item(item_id).expect("item").quantity_available,
        3
    );
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer again"), 0);
}

#[test]
fn cancel_before_transfer_leaves_portions_for_transfer() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let claim_ops = ClaimOperations::new(pool.clone(), RESERVATION_WINDOW_SECS);
    let donation_ops = DonationOperations::new(pool.clone());
    let item_id = fixtures.food_item_ids[0];

    let claim = claim_ops
        .reserve_food(fixtures.student_id, item_id, 2)
        .expect("reserve");
    lapse(&pool, item_id);
    claim_ops
        .cancel_claim(claim.claim_id, fixtures.student_id)
        .expect("cancel");

    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 1);
    let donation = donation_ops
        .list_all_donations()
        .expect("list")
        .into_iter()
        .find(|d| d.food.food_id == item_id)
        .expect("donation");
    assert_eq!(donation.donation.quantity_donated, 5);
}

#[test]
fn extending_a_donated_item_keeps_it_off_the_catalog() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let donation_ops = DonationOperations::new(pool.clone());
    let food_ops = FoodOperations::new(pool.clone(), DEFAULT_MIN_ITEM_QUANTITY);
    let item_id = fixtures.food_item_ids[0];

    lapse(&pool, item_id);
    assert_eq!(donation_ops.transfer_expired_items().expect("transfer"), 1);

    food_ops
        .update_food_item(
            item_id,
            UpdateFoodItem {
                available_until: Some(Utc::now() + Duration::hours(1)),
                ..Default::default()
            },
        )
        .expect("extend");
    let outcome = food_ops.reconcile().expect("sweep");
    assert_eq!(outcome.reactivated, 0);

    assert!(!food_ops.get_food_item(item_id).expect("item").is_active);
    assert!(food_ops
        .list_active_items()
        .expect("catalog")
        .iter()
        .all(|entry| entry.item.food_id != item_id));
}
