use crate::auth::SessionJwtConfig;
use crate::config::AppConfig;
use crate::db::{
    establish_connection_pool, run_db_migrations, DbConnection, DbPool, RepositoryError,
    DEFAULT_MIN_ITEM_QUANTITY,
};
use crate::models::common::UserRole;
use crate::models::food::NewFoodItem;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use std::sync::Once;

// Fixture strategy:
// - Users are inserted directly with fixed external ids per role.
// - Items are listed three hours ahead unless a test needs a lapsed one.
const TEST_DEV_BYPASS_TOKEN: &str = "test-bypass-token";
const TEST_SESSION_JWT_SECRET: &str = "test-session-secret";
static TEST_THREADS_GUARD: Once = Once::new();

fn ensure_single_threaded_tests() {
    TEST_THREADS_GUARD.call_once(|| {
        let threads = test_threads_from_args().or_else(|| std::env::var("RUST_TEST_THREADS").ok());
        if threads.as_deref() != Some("1") {
            panic!(
                "Tests must run with --test-threads=1 or RUST_TEST_THREADS=1 because init_test_env mutates environment variables."
            );
        }
    });
}

fn test_threads_from_args() -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == "--test-threads" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--test-threads=") {
            return Some(value.to_string());
        }
    }
    None
}

fn set_env_if_unset(key: &str, value: &str) {
    if std::env::var_os(key).is_none() {
        std::env::set_var(key, value);
    }
}

pub fn init_test_env() {
    ensure_single_threaded_tests();
    set_env_if_unset("DEV_BYPASS_TOKEN", TEST_DEV_BYPASS_TOKEN);
    set_env_if_unset("SESSION_JWT_SECRET", TEST_SESSION_JWT_SECRET);
}

pub fn build_test_pool(database_url: &str) -> DbPool {
    let pool = establish_connection_pool(database_url).expect("Unable to build pool");
    run_db_migrations(pool.clone()).expect("Unable to run migrations");
    pool
}

pub fn reset_db(pool: &DbPool) -> Result<(), RepositoryError> {
    let mut conn = DbConnection::new(pool)?;
    diesel::sql_query(
        "TRUNCATE TABLE food_donations, food_claims, food_items, users RESTART IDENTITY CASCADE",
    )
    .execute(conn.connection())
    .map_err(RepositoryError::DatabaseError)?;
    Ok(())
}

pub fn test_app_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        min_item_quantity: DEFAULT_MIN_ITEM_QUANTITY,
        sweeper_interval_secs: 0,
        session: SessionJwtConfig::from_env().expect("session config"),
    }
}

pub struct TestFixtures {
    pub student_id: i32,
    pub other_student_id: i32,
    pub staff_id: i32,
    pub other_staff_id: i32,
    pub admin_id: i32,
    /// Two items of `staff_id` (5 and 2 portions) and one of `other_staff_id` (3 portions).
    pub food_item_ids: Vec<i32>,
}

pub fn seed_basic_fixtures(pool: &DbPool) -> Result<TestFixtures, RepositoryError> {
    let mut conn = DbConnection::new(pool)?;
    let conn = conn.connection();

    let student_id = insert_user(
        conn,
        "sso|student-1",
        "asha@campus.edu",
        "Asha Student",
        UserRole::Student,
    )?;
    let other_student_id = insert_user(
        conn,
        "sso|student-2",
        "ravi@campus.edu",
        "Ravi Student",
        UserRole::Student,
    )?;
    let staff_id = insert_user(
        conn,
        "sso|staff-1",
        "north@campus.edu",
        "North Canteen Staff",
        UserRole::Staff,
    )?;
    let other_staff_id = insert_user(
        conn,
        "sso|staff-2",
        "south@campus.edu",
        "South Canteen Staff",
        UserRole::Staff,
    )?;
    let admin_id = insert_user(
        conn,
        "sso|admin-1",
        "admin@campus.edu",
        "Campus Admin",
        UserRole::Admin,
    )?;

    let until = Utc::now() + Duration::hours(3);
    let thali = seed_food_item(conn, staff_id, "Veg Thali", "North Canteen", 5, 80.0, 40.0, until)?;
    let biryani = seed_food_item(
        conn,
        staff_id,
        "Chicken Biryani",
        "North Canteen",
        2,
        120.0,
        60.0,
        until,
    )?;
    let idli = seed_food_item(
        conn,
        other_staff_id,
        "Idli Sambar",
        "South Canteen",
        3,
        40.0,
        15.0,
        until,
    )?;

    Ok(TestFixtures {
        student_id,
        other_student_id,
        staff_id,
        other_staff_id,
        admin_id,
        food_item_ids: vec![thali, biryani, idli],
    })
}

pub fn insert_user(
    conn: &mut PgConnection,
    external_id_val: &str,
    email_val: &str,
    name_val: &str,
    role_val: UserRole,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::users::dsl::*;

    diesel::insert_into(users)
        .values((
            external_id.eq(external_id_val),
            email.eq(email_val),
            name.eq(name_val),
            role.eq(role_val),
        ))
        .returning(user_id)
        .get_result(conn)
        .map_err(RepositoryError::DatabaseError)
}

#[allow(clippy::too_many_arguments)]
pub fn seed_food_item(
    conn: &mut PgConnection,
    created_by_val: i32,
    name_val: &str,
    canteen_val: &str,
    quantity_val: i32,
    original_price_val: f64,
    discounted_price_val: f64,
    available_until_val: DateTime<Utc>,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::food_items::dsl::*;

    let new_item = NewFoodItem {
        created_by: created_by_val,
        name: name_val.to_string(),
        description: None,
        canteen_name: canteen_val.to_string(),
        canteen_location: None,
        quantity_available: quantity_val,
        original_price: original_price_val,
        discounted_price: discounted_price_val,
        image_url: None,
        available_until: available_until_val,
        is_active: true,
    };

    diesel::insert_into(food_items)
        .values(&new_item)
        .returning(food_id)
        .get_result(conn)
        .map_err(RepositoryError::DatabaseError)
}

/// Moves an item's deadline, bypassing validation, to simulate the clock
/// passing it.
pub fn set_available_until(
    conn: &mut PgConnection,
    search_food_id: i32,
    until: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    use crate::db::schema::food_items::dsl::*;

    diesel::update(food_items.filter(food_id.eq(search_food_id)))
        .set(available_until.eq(until))
        .execute(conn)
        .map_err(RepositoryError::DatabaseError)?;
    Ok(())
}
