use crate::auth::principal::Principal;
use crate::models::common::UserRole;
use actix_web::dev::Payload;
use actix_web::error::{ErrorForbidden, ErrorUnauthorized};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

fn principal_of(req: &HttpRequest) -> Result<Principal, Error> {
    req.extensions()
        .get::<Principal>()
        .cloned()
        .ok_or_else(|| ErrorUnauthorized("missing principal"))
}

/// Any authenticated caller, regardless of role.
pub struct Identity(pub Principal);

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(principal_of(req).map(Identity))
    }
}

pub struct StudentPrincipal {
    user_id: i32,
}

impl StudentPrincipal {
    pub fn user_id(&self) -> i32 {
        self.user_id
    }
}

impl FromRequest for StudentPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(principal_of(req).and_then(|p| match p.role {
            UserRole::Student => Ok(StudentPrincipal { user_id: p.user_id }),
            _ => Err(ErrorForbidden("students only")),
        }))
    }
}

/// Canteen staff or admins.
pub struct StaffPrincipal {
    user_id: i32,
    role: UserRole,
}

impl StaffPrincipal {
    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl FromRequest for StaffPrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(principal_of(req).and_then(|p| {
            if p.role.is_staff() {
                Ok(StaffPrincipal {
                    user_id: p.user_id,
                    role: p.role,
                })
            } else {
                Err(ErrorForbidden("staff only"))
            }
        }))
    }
}
