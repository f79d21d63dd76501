use crate::api::repository_status;
use crate::auth::StaffPrincipal;
use crate::db::{DonationOperations, RepositoryError};
use crate::enums::staff::{DonationResponse, DonationsResponse, TransferResponse};
use crate::models::donation::NgoReservation;
use actix_web::{get, post, web, HttpResponse, Responder};

fn donation_error(e: &RepositoryError) -> HttpResponse {
    HttpResponse::build(repository_status(e)).json(DonationResponse {
        status: "error".to_string(),
        data: None,
        error: Some(e.to_string()),
    })
}

fn donations_result(
    result: Result<Vec<crate::models::donation::DonationWithFood>, RepositoryError>,
    op: &str,
) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(DonationsResponse {
            status: "ok".to_string(),
            data,
            error: None,
        }),
        Err(e) => {
            error!("DONATIONS: {}: {}", op, e);
            HttpResponse::build(repository_status(&e)).json(DonationsResponse {
                status: "error".to_string(),
                data: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    }
}

#[utoipa::path(
    tag = "Donations",
    responses(
        (status = 200, description = "Every donation, newest first", body = DonationsResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "List the donation pool"
)]
#[get("")]
pub(super) async fn list_donations(
    donation_ops: web::Data<DonationOperations>,
    _staff: StaffPrincipal,
) -> actix_web::Result<impl Responder> {
    let result = web::block(move || donation_ops.list_all_donations()).await?;
    Ok(donations_result(result, "list_donations()"))
}

#[utoipa::path(
    tag = "Donations",
    responses(
        (status = 200, description = "Donations of items listed by the caller", body = DonationsResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "List donations of the caller's own items"
)]
#[get("/mine")]
pub(super) async fn list_my_donations(
    donation_ops: web::Data<DonationOperations>,
    staff: StaffPrincipal,
) -> actix_web::Result<impl Responder> {
    let staff_id = staff.user_id();
    let result = web::block(move || donation_ops.list_donations_by_creator(staff_id)).await?;
    Ok(donations_result(result, "list_my_donations()"))
}

#[utoipa::path(
    tag = "Donations",
    responses(
        (status = 200, description = "Number of lapsed items moved to the donation pool", body = TransferResponse),
        (status = 403, description = "Caller is not staff")
    ),
    summary = "Move leftover portions of lapsed items into the donation pool"
)]
#[post("/transfer")]
pub(super) async fn transfer_expired(
    donation_ops: web::Data<DonationOperations>,
    staff: StaffPrincipal,
) -> actix_web::Result<impl Responder> {
    let result = web::block(move || donation_ops.transfer_expired_items()).await?;
    Ok(match result {
        Ok(transferred) => {
            info!(
                "Donation transfer by staff {}: {} items",
                staff.user_id(),
                transferred
            );
            HttpResponse::Ok().json(TransferResponse {
                status: "ok".to_string(),
                transferred,
                error: None,
            })
        }
        Err(e) => {
            error!("DONATIONS: transfer_expired(): {}", e);
            HttpResponse::build(repository_status(&e)).json(TransferResponse {
                status: "error".to_string(),
                transferred: 0,
                error: Some(e.to_string()),
            })
        }
    })
}

#[utoipa::path(
    tag = "Donations",
    params(
        ("id", description = "Donation to reserve"),
    ),
    request_body = NgoReservation,
    responses(
        (status = 200, description = "Donation reserved for the NGO", body = DonationResponse),
        (status = 400, description = "NGO details missing", body = DonationResponse),
        (status = 404, description = "Donation not found", body = DonationResponse),
        (status = 409, description = "Donation is no longer available", body = DonationResponse)
    ),
    summary = "Reserve a donation for an NGO"
)]
#[post("/{id}/reserve")]
pub(super) async fn reserve_donation(
    donation_ops: web::Data<DonationOperations>,
    _staff: StaffPrincipal,
    path: web::Path<(i32,)>,
    req_data: web::Json<NgoReservation>,
) -> actix_web::Result<impl Responder> {
    let donation_id = path.into_inner().0;
    let ngo = req_data.into_inner();
    let result = web::block(move || donation_ops.reserve_for_ngo(donation_id, &ngo)).await?;
    Ok(match result {
        Ok(donation) => {
            debug!(
                "Donation {} reserved for {}",
                donation.donation_id,
                donation.ngo_name.as_deref().unwrap_or_default()
            );
            HttpResponse::Ok().json(DonationResponse {
                status: "ok".to_string(),
                data: Some(donation),
                error: None,
            })
        }
        Err(e) => {
            debug!("DONATIONS: reserve_donation({}): {}", donation_id, e);
            donation_error(&e)
        }
    })
}

#[utoipa::path(
    tag = "Donations",
    params(
        ("id", description = "Donation picked up by the NGO"),
    ),
    responses(
        (status = 200, description = "Donation marked collected", body = DonationResponse),
        (status = 404, description = "Donation not found", body = DonationResponse),
        (status = 409, description = "Donation is not reserved for an NGO", body = DonationResponse)
    ),
    summary = "Mark a reserved donation as collected"
)]
#[post("/{id}/collect")]
pub(super) async fn collect_donation(
    donation_ops: web::Data<DonationOperations>,
    _staff: StaffPrincipal,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let donation_id = path.into_inner().0;
    let result = web::block(move || donation_ops.mark_collected(donation_id)).await?;
    Ok(match result {
        Ok(donation) => {
            debug!("Donation {} collected", donation.donation_id);
            HttpResponse::Ok().json(DonationResponse {
                status: "ok".to_string(),
                data: Some(donation),
                error: None,
            })
        }
        Err(e) => {
            debug!("DONATIONS: collect_donation({}): {}", donation_id, e);
            donation_error(&e)
        }
    })
}
