use crate::api::repository_status;
use crate::auth::StudentPrincipal;
use crate::db::ClaimOperations;
use crate::enums::common::ClaimResponse;
use crate::models::common::ClaimStatus;
use actix_web::{get, web, HttpResponse, Responder};
use image::ImageEncoder;
use qrcode::QrCode;

/// Renders `payload` as a PNG QR image.
pub fn render_qr_png(payload: &str) -> Result<Vec<u8>, String> {
    let qr = QrCode::new(payload.as_bytes()).map_err(|e| format!("QR encoding error: {e}"))?;
    let image = qr.render::<image::Luma<u8>>().quiet_zone(true).build();

    let mut png_buf: Vec<u8> = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| format!("PNG encoding error: {e}"))?;
    Ok(png_buf)
}

fn claim_rejection(status: actix_web::http::StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ClaimResponse {
        status: "error".to_string(),
        data: None,
        error: Some(message),
    })
}

#[utoipa::path(
    tag = "Claims",
    params(
        ("id", description = "Claim to render"),
    ),
    responses(
        (status = 200, description = "QR code PNG image of the claim code", content_type = "image/png"),
        (status = 403, description = "Not your claim", body = ClaimResponse),
        (status = 404, description = "Claim not found", body = ClaimResponse),
        (status = 409, description = "Claim is no longer reserved", body = ClaimResponse),
        (status = 500, description = "Failed to generate QR code")
    ),
    summary = "Render a reserved claim's code as a QR image"
)]
#[get("/{id}/qr")]
pub(super) async fn generate_claim_qr(
    claim_ops: web::Data<ClaimOperations>,
    student: StudentPrincipal,
    path: web::Path<(i32,)>,
) -> actix_web::Result<impl Responder> {
    let claim_id = path.into_inner().0;
    let uid = student.user_id();

    let claim = match web::block(move || claim_ops.get_claim(claim_id)).await? {
        Ok(claim) => claim,
        Err(e) => {
            debug!("generate_claim_qr: claim {}: {}", claim_id, e);
            return Ok(claim_rejection(repository_status(&e), e.to_string()));
        }
    };

    if claim.user_id != uid {
        return Ok(claim_rejection(
            actix_web::http::StatusCode::FORBIDDEN,
            "You do not own this claim".to_string(),
        ));
    }
    if claim.status != ClaimStatus::Reserved {
        return Ok(claim_rejection(
            actix_web::http::StatusCode::CONFLICT,
            format!("Claim {} is currently '{}'", claim_id, claim.status.as_str()),
        ));
    }

    let png_buf = render_qr_png(&claim.claim_code).map_err(|e| {
        error!("generate_claim_qr: claim {}: {}", claim_id, e);
        actix_web::error::ErrorInternalServerError("Failed to generate QR code")
    })?;

    debug!(
        "generate_claim_qr: generated QR for claim {} student {}",
        claim_id, uid
    );
    Ok(HttpResponse::Ok().content_type("image/png").body(png_buf))
}
