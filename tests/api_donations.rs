mod common;

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::test;
use campus_meals::db::DbConnection;
use campus_meals::test_utils::{build_test_pool, set_available_until};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

fn lapse_items(db_url: &str, item_ids: &[i32]) {
    let pool = build_test_pool(db_url);
    let mut conn = DbConnection::new(&pool).expect("db connection");
    for &item_id in item_ids {
        set_available_until(conn.connection(), item_id, Utc::now() - Duration::minutes(5))
            .expect("lapse item");
    }
}

#[actix_rt::test]
async fn transfer_reserve_collect_over_http() {
    let (app, fixtures, db_url) = common::setup_api_app().await;
    lapse_items(&db_url, &[fixtures.food_item_ids[0]]);

    let req = test::TestRequest::post()
        .uri(&format!("/donations/transfer?as=staff-{}", fixtures.staff_id))
        .insert_header(common::auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["transferred"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/donations/mine?as=staff-{}", fixtures.staff_id))
        .insert_header(common::auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let donations = body["data"].as_array().expect("donations");
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0]["status"], "available");
    assert_eq!(donations[0]["quantity_donated"], 5);
    let donation_id = donations[0]["donation_id"].as_i64().expect("donation id");

    let req = test::TestRequest::post()
        .uri(&format!(
            "/donations/{}/collect?as=staff-{}",
            donation_id, fixtures.staff_id
        ))
        .insert_header(common::auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/donations/{}/reserve?as=staff-{}",
            donation_id, fixtures.staff_id
        ))
        .insert_header(common::auth_header())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(json!({
            "ngo_name": "Roti Bank",
            "ngo_contact": "Imran",
            "ngo_phone": "+91 99000 11111"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "reserved_for_ngo");
    assert_eq!(body["data"]["ngo_name"], "Roti Bank");

    let req = test::TestRequest::post()
        .uri(&format!(
            "/donations/{}/collect?as=staff-{}",
            donation_id, fixtures.staff_id
        ))
        .insert_header(common::auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "collected");
}

#[actix_rt::test]
async fn reserve_with_blank_phone_is_bad_request() {
    let (app, fixtures, db_url) = common::setup_api_app().await;
    lapse_items(&db_url, &[fixtures.food_item_ids[2]]);

    let req = test::TestRequest::post()
        .uri(&format!("/donations/transfer?as=staff-{}", fixtures.staff_id))
        .insert_header(common::auth_header())
        .to_request();
    let _ = test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!(
            "/donations/1/reserve?as=staff-{}",
            fixtures.other_staff_id
        ))
        .insert_header(common::auth_header())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(json!({
            "ngo_name": "Roti Bank",
            "ngo_contact": "Imran",
            "ngo_phone": ""
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn students_cannot_see_donations() {
    let (app, fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::get()
        .uri(&format!("/donations?as=student-{}", fixtures.student_id))
        .insert_header(common::auth_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
