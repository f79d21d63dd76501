mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::Value;

#[actix_rt::test]
async fn root_is_public() {
    let (app, _fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"Server up!"));
}

#[actix_rt::test]
async fn openapi_document_lists_routes() {
    let (app, _fixtures, _db_url) = common::setup_api_app().await;

    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let paths = body["paths"].as_object().expect("paths object");
    for expected in [
        "/food",
        "/food/{id}",
        "/claims",
        "/claims/verify",
        "/claims/{id}/complete",
        "/donations/transfer",
        "/stats",
        "/users/me",
    ] {
        assert!(paths.contains_key(expected), "missing path {expected}");
    }
}
