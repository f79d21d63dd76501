use crate::db::UserOperations;
use account::*;
use actix_web::middleware::NormalizePath;
use actix_web::web;
use utoipa_actix_web::{scope, service_config::ServiceConfig};

mod account;

pub fn config(cfg: &mut ServiceConfig, user_ops: &UserOperations) {
    cfg.service(
        scope::scope("/users")
            .wrap(NormalizePath::trim())
            .app_data(web::Data::new(user_ops.clone()))
            .service(get_me),
    );
}
