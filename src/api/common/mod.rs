use crate::api::ContentTypeHeader;
use crate::db::{ClaimOperations, StatsOperations};
use actix_web::middleware::NormalizePath;
use actix_web::web;
use claims::*;
use qr::*;
use stats::*;
use utoipa_actix_web::scope;
use utoipa_actix_web::service_config::ServiceConfig;

mod claims;
pub mod qr;
mod stats;

pub(super) fn config(
    cfg: &mut ServiceConfig,
    claim_ops: &ClaimOperations,
    stats_ops: &StatsOperations,
) {
    cfg.service(
        scope::scope("/claims")
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(claim_ops.clone()))
            .service(list_my_claims)
            .service(list_active_claims)
            .service(cancel_claim)
            .service(complete_claim)
            .service(generate_claim_qr)
            .service(
                scope::scope("")
                    .guard(ContentTypeHeader)
                    .service(reserve_food)
                    .service(verify_claim),
            ),
    )
    .service(
        scope::scope("/stats")
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(stats_ops.clone()))
            .service(get_stats),
    );
}
