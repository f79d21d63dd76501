use crate::api::ContentTypeHeader;
use crate::db::{DonationOperations, FoodOperations};
use actix_web::middleware::NormalizePath;
use actix_web::web;
use donations::*;
use food::*;
use utoipa_actix_web::{scope, service_config::ServiceConfig};

mod donations;
mod food;

pub fn config(
    cfg: &mut ServiceConfig,
    food_ops: &FoodOperations,
    donation_ops: &DonationOperations,
) {
    cfg.service(
        scope::scope("/food")
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(food_ops.clone()))
            .service(list_active_food)
            .service(list_my_food)
            .service(get_food_item)
            .service(delete_food_item)
            .service(
                scope::scope("")
                    .guard(ContentTypeHeader)
                    .service(create_food_item)
                    .service(update_food_item),
            ),
    )
    .service(
        scope::scope("/donations")
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(donation_ops.clone()))
            .service(list_donations)
            .service(list_my_donations)
            .service(transfer_expired)
            .service(collect_donation)
            .service(
                scope::scope("")
                    .guard(ContentTypeHeader)
                    .service(reserve_donation),
            ),
    );
}
