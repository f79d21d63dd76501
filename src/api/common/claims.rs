use crate::api::repository_status;
use crate::auth::{StaffPrincipal, StudentPrincipal};
use crate::db::{ClaimOperations, RepositoryError};
use crate::enums::common::{
    ActiveClaimsResponse, ClaimDetailsResponse, ClaimResponse, ClaimsResponse, ReserveRequest,
    VerifyRequest,
};
use actix_web::{get, post, web, HttpResponse, Responder};

fn claim_error(e: &RepositoryError) -> HttpResponse {
    HttpResponse::build(repository_status(e)).json(ClaimResponse {
        status: "error".to_string(),
        data: None,
        error: Some(e.to_string()),
    })
}

#[utoipa::path(
    tag = "Claims",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Portions reserved, claim code issued", body = ClaimResponse),
        (status = 400, description = "Quantity below one", body = ClaimResponse),
        (status = 403, description = "Caller is not a student"),
        (status = 409, description = "Item inactive, lapsed or short of portions", body = ClaimResponse)
    ),
    summary = "Reserve portions of a food item"
)]
#[post("")]
pub(super) async fn reserve_food(
    claim_ops: web::Data<ClaimOperations>,
    student: StudentPrincipal,
    req_data: web::Json<ReserveRequest>,
) -> actix_web::Result<impl Responder> {
    let ReserveRequest { food_id, quantity } = req_data.into_inner();
    let uid = student.user_id();
    let result = web::block(move || claim_ops.reserve_food(uid, food_id, quantity)).await?;

    Ok(match result {
        Ok(claim) => {
            info!(
                "Claim {} created for student {} on item {}",
                claim.claim_id, uid, food_id
            );
            HttpResponse::Ok().json(ClaimResponse {
                status: "ok".to_string(),
                data: Some(claim),
                error: None,
            })
        }
        Err(e) => {
            debug!(
                "reserve_food: student {} could not reserve {} of item {}: {}",
                uid, quantity, food_id, e
            );
            claim_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Claims",
    responses(
        (status = 200, description = "The caller's claims, newest first", body = ClaimsResponse),
        (status = 403, description = "Caller is not a student")
    ),
    summary = "List the caller's claims"
)]
#[get("/mine")]
pub(super) async fn list_my_claims(
    claim_ops: web::Data<ClaimOperations>,
    student: StudentPrincipal,
) -> actix_web::Result<impl Responder> {
    let uid = student.user_id();
    let result = web::block(move || claim_ops.list_claims_by_user(uid)).await?;
    Ok(match result {
        Ok(data) => HttpResponse::Ok().json(ClaimsResponse {
            status: "ok".to_string(),
            data,
            error: None,
        }),
        Err(e) => {
            error!("CLAIMS: list_my_claims({}): {}", uid, e);
            HttpResponse::build(repository_status(&e)).json(ClaimsResponse {
                status: "error".to_string(),
                data: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    })
}

#[utoipa::path(
    tag = "Claims",
    params(
        ("id", description = "Claim to cancel"),
    ),
    responses(
        (status = 200, description = "Claim cancelled, portions returned to the item", body = ClaimResponse),
        (status = 404, description = "No such claim for this student", body = ClaimResponse),
        (status = 409, description = "Claim is no longer reserved", body = ClaimResponse)
    ),
    summary = "Cancel one of the caller's reservations"
)]
#[post("/{id}/cancel")]
pub(super) async fn cancel_claim(
    claim_ops: web::Data<ClaimOperations>,
    student: StudentPrincipal,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let claim_id = path.into_inner().0;
    let uid = student.user_id();
    let result = web::block(move || claim_ops.cancel_claim(claim_id, uid)).await?;
    Ok(match result {
        Ok(claim) => {
            debug!("Claim {} cancelled by student {}", claim_id, uid);
            HttpResponse::Ok().json(ClaimResponse {
                status: "ok".to_string(),
                data: Some(claim),
                error: None,
            })
        }
        Err(e) => {
            debug!("CLAIMS: cancel_claim({}): {}", claim_id, e);
            claim_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Claims",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Reservation found with student and item details", body = ClaimDetailsResponse),
        (status = 404, description = "Unknown claim code", body = ClaimDetailsResponse),
        (status = 409, description = "Claim already redeemed, cancelled or expired", body = ClaimDetailsResponse)
    ),
    summary = "Look up a claim code presented at the counter"
)]
#[post("/verify")]
pub(super) async fn verify_claim(
    claim_ops: web::Data<ClaimOperations>,
    staff: StaffPrincipal,
    req_data: web::Json<VerifyRequest>,
) -> actix_web::Result<impl Responder> {
    let VerifyRequest { claim_code } = req_data.into_inner();
    let result = web::block(move || claim_ops.verify_claim_code(&claim_code)).await?;
    Ok(match result {
        Ok(details) => {
            debug!(
                "Claim {} verified by staff {}",
                details.claim.claim_id,
                staff.user_id()
            );
            HttpResponse::Ok().json(ClaimDetailsResponse {
                status: "ok".to_string(),
                data: Some(details),
                error: None,
            })
        }
        Err(e) => {
            debug!("CLAIMS: verify_claim(): {}", e);
            HttpResponse::build(repository_status(&e)).json(ClaimDetailsResponse {
                status: "error".to_string(),
                data: None,
                error: Some(e.to_string()),
            })
        }
    })
}

#[utoipa::path(
    tag = "Claims",
    params(
        ("id", description = "Claim being handed over"),
    ),
    responses(
        (status = 200, description = "Claim redeemed", body = ClaimResponse),
        (status = 404, description = "Claim not found", body = ClaimResponse),
        (status = 409, description = "Claim is not reserved or has expired", body = ClaimResponse)
    ),
    summary = "Complete a verified claim"
)]
#[post("/{id}/complete")]
pub(super) async fn complete_claim(
    claim_ops: web::Data<ClaimOperations>,
    staff: StaffPrincipal,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let claim_id = path.into_inner().0;
    let result = web::block(move || claim_ops.complete_claim(claim_id)).await?;
    Ok(match result {
        Ok(claim) => {
            info!("Claim {} completed by staff {}", claim_id, staff.user_id());
            HttpResponse::Ok().json(ClaimResponse {
                status: "ok".to_string(),
                data: Some(claim),
                error: None,
            })
        }
        Err(e) => {
            debug!("CLAIMS: complete_claim({}): {}", claim_id, e);
            claim_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Claims",
    responses(
        (status = 200, description = "Outstanding reservations, newest first", body = ActiveClaimsResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "List reservations awaiting pickup"
)]
#[get("/active")]
pub(super) async fn list_active_claims(
    claim_ops: web::Data<ClaimOperations>,
    _staff: StaffPrincipal,
) -> actix_web::Result<impl Responder> {
    let result = web::block(move || claim_ops.list_active_reservations()).await?;
    Ok(match result {
        Ok(data) => HttpResponse::Ok().json(ActiveClaimsResponse {
            status: "ok".to_string(),
            data,
            error: None,
        }),
        Err(e) => {
            error!("CLAIMS: list_active_claims(): {}", e);
            HttpResponse::build(repository_status(&e)).json(ActiveClaimsResponse {
                status: "error".to_string(),
                data: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    })
}
