use crate::api::repository_status;
use crate::auth::Identity;
use crate::db::UserOperations;
use crate::enums::users::UserResponse;
use actix_web::{get, web, HttpResponse, Responder};

#[utoipa::path(
    tag = "Users",
    responses(
        (status = 200, description = "The caller's user record", body = UserResponse),
        (status = 404, description = "Caller has no stored user record", body = UserResponse)
    ),
    summary = "Fetch the current user"
)]
#[get("/me")]
pub(super) async fn get_me(
    user_ops: web::Data<UserOperations>,
    caller: Identity,
) -> actix_web::Result<impl Responder> {
    let uid = caller.0.user_id;
    let result = web::block(move || user_ops.get_user(uid)).await?;
    Ok(match result {
        Ok(user) => HttpResponse::Ok().json(UserResponse {
            status: "ok".to_string(),
            data: Some(user),
            error: None,
        }),
        Err(e) => {
            debug!("USERS: get_me({}): {}", uid, e);
            HttpResponse::build(repository_status(&e)).json(UserResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    })
}
