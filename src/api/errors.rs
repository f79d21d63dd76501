use crate::db::RepositoryError;
use crate::enums::common::GeneralResponse;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpRequest, HttpResponse};

pub fn default_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    error!("Error in request: {} \n Error: {}", req.full_url(), err);
    let body = GeneralResponse {
        status: "error".to_string(),
        error: Some(format!("Invalid request body: {}", err)),
    };
    actix_web::error::InternalError::from_response(err, HttpResponse::BadRequest().json(body))
        .into()
}

pub(crate) fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::ValidationError(_) => StatusCode::BAD_REQUEST,
        RepositoryError::NotFound(_) | RepositoryError::InvalidCode(_) => StatusCode::NOT_FOUND,
        RepositoryError::NotAvailable(_, _)
        | RepositoryError::WrongState(_, _)
        | RepositoryError::Expired(_) => StatusCode::CONFLICT,
        RepositoryError::DatabaseError(_) | RepositoryError::ConnectionPoolError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_client_statuses() {
        assert_eq!(
            repository_status(&RepositoryError::ValidationError("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            repository_status(&RepositoryError::InvalidCode("ABC".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            repository_status(&RepositoryError::NotAvailable(3, "sold out".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            repository_status(&RepositoryError::Expired("claim 4".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            repository_status(&RepositoryError::DatabaseError(
                diesel::result::Error::NotFound
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
