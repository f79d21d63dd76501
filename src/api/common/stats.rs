use crate::api::repository_status;
use crate::auth::Identity;
use crate::db::{MealStats, StatsOperations};
use crate::enums::common::StatsResponse;
use actix_web::{get, web, HttpResponse, Responder};

#[utoipa::path(
    tag = "Stats",
    responses(
        (status = 200, description = "Platform-wide impact figures", body = StatsResponse)
    ),
    summary = "Meals saved, active students, partner canteens and total savings"
)]
#[get("")]
pub(super) async fn get_stats(
    stats_ops: web::Data<StatsOperations>,
    _caller: Identity,
) -> actix_web::Result<impl Responder> {
    let result = web::block(move || stats_ops.get_stats()).await?;
    Ok(match result {
        Ok(data) => HttpResponse::Ok().json(StatsResponse {
            status: "ok".to_string(),
            data,
            error: None,
        }),
        Err(e) => {
            error!("STATS: get_stats(): {}", e);
            HttpResponse::build(repository_status(&e)).json(StatsResponse {
                status: "error".to_string(),
                data: MealStats::default(),
                error: Some(e.to_string()),
            })
        }
    })
}
