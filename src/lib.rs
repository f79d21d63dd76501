#[macro_use]
extern crate log;

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod enums;
pub mod models;
pub mod services;
pub mod test_utils;
pub mod traits;

use crate::auth::AuthLayer;
use crate::config::AppConfig;
use crate::db::{
    ClaimOperations, DbPool, DonationOperations, FoodOperations, StatsOperations, UserOperations,
    RESERVATION_WINDOW_SECS,
};
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse};
use utoipa_actix_web::AppExt;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub user_ops: UserOperations,
    pub food_ops: FoodOperations,
    pub claim_ops: ClaimOperations,
    pub donation_ops: DonationOperations,
    pub stats_ops: StatsOperations,
}

impl AppState {
    /// Builds the repositories over an already migrated pool.
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        let user_ops = UserOperations::new(db.clone());
        let food_ops = FoodOperations::new(db.clone(), config.min_item_quantity);
        let claim_ops = ClaimOperations::new(db.clone(), RESERVATION_WINDOW_SECS);
        let donation_ops = DonationOperations::new(db.clone());
        let stats_ops = StatsOperations::new(db);
        AppState {
            config,
            user_ops,
            food_ops,
            claim_ops,
            donation_ops,
            stats_ops,
        }
    }
}

async fn openapi_json(doc: web::Data<utoipa::openapi::OpenApi>) -> HttpResponse {
    HttpResponse::Ok().json(doc.get_ref())
}

/// Assembles the HTTP application: routes, OpenAPI document, JSON error
/// handling and the identity middleware.
pub fn build_app(
    state: &AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let (app, openapi) = App::new()
        .into_utoipa_app()
        .configure(|cfg| api::configure(cfg, state))
        .split_for_parts();

    app.app_data(web::JsonConfig::default().error_handler(api::default_error_handler))
        .service(
            web::resource("/api-docs/openapi.json")
                .app_data(web::Data::new(openapi))
                .route(web::get().to(openapi_json)),
        )
        .wrap(AuthLayer::new(
            state.config.session.clone(),
            state.user_ops.clone(),
        ))
        .wrap(Logger::default())
}
