pub mod common;
mod errors;
pub mod staff;
pub mod users;

use actix_web::guard::{Guard, GuardContext};
use actix_web::http::header;
use actix_web::{get, HttpResponse, Responder};
pub(crate) use errors::repository_status;
pub use errors::default_error_handler;
use utoipa_actix_web::service_config::ServiceConfig;

use crate::AppState;

/// Matches requests whose `Content-Type` is `application/json`, with or
/// without parameters such as `charset`.
pub struct ContentTypeHeader;

impl Guard for ContentTypeHeader {
    fn check(&self, ctx: &GuardContext<'_>) -> bool {
        ctx.head()
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }
}

#[utoipa::path(
    tag = "Health",
    responses(
        (status = 200, description = "Server is up")
    ),
    summary = "Liveness probe"
)]
#[get("/")]
pub(crate) async fn root_endpoint() -> impl Responder {
    HttpResponse::Ok().body("Server up!")
}

pub fn configure(cfg: &mut ServiceConfig, state: &AppState) {
    cfg.service(root_endpoint)
        .configure(|cfg| staff::config(cfg, &state.food_ops, &state.donation_ops))
        .configure(|cfg| common::config(cfg, &state.claim_ops, &state.stats_ops))
        .configure(|cfg| users::config(cfg, &state.user_ops));
}
