use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, http::header, Error, HttpMessage};
use futures::future::LocalBoxFuture;

use crate::auth::config::SessionJwtConfig;
use crate::auth::session_jwt::verify_session_jwt;
use crate::auth::Principal;
use crate::db::{RepositoryError, UserOperations};
use crate::models::common::UserRole;

const PUBLIC_PATHS: [&str; 2] = ["/", "/api-docs/openapi.json"];

#[derive(Clone)]
pub struct AuthLayer {
    session_cfg: SessionJwtConfig,
    user_ops: UserOperations,
}

impl AuthLayer {
    pub fn new(session_cfg: SessionJwtConfig, user_ops: UserOperations) -> Self {
        Self {
            session_cfg,
            user_ops,
        }
    }

    /// `?as=<role>-<id>` selects the identity when the dev token is presented.
    /// The id must belong to an existing user; the role is taken as given.
    fn dev_principal(&self, token: &str, query: &str) -> Option<Principal> {
        let dev_token = self.session_cfg.dev_bypass_token.as_deref()?;
        if token != dev_token {
            return None;
        }
        let principal = query
            .split('&')
            .find_map(|kv| kv.strip_prefix("as="))
            .and_then(Principal::from_dev_param)
            .unwrap_or(Principal {
                user_id: 1,
                role: UserRole::Student,
            });
        Some(principal)
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddleware {
            service: Rc::new(service),
            inner: self.clone(),
        }))
    }
}

pub struct AuthMiddleware<S> {
    service: Rc<S>,
    inner: AuthLayer,
}

impl<S, B> Service<ServiceRequest> for AuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            #[allow(clippy::redundant_async_block)]
            return Box::pin(async move { fut.await });
        }

        let token = match req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
        {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Box::pin(async { Err(ErrorUnauthorized("missing or invalid auth header")) })
            }
        };

        if let Some(principal) = self.inner.dev_principal(&token, req.query_string()) {
            let user_ops = self.inner.user_ops.clone();
            let srv = self.service.clone();
            return Box::pin(async move {
                let search_id = principal.user_id;
                match actix_web::web::block(move || user_ops.get_user(search_id)).await {
                    Ok(Ok(_)) => {
                        debug!("dev bypass as {} {}", principal.role.as_str(), search_id);
                        req.extensions_mut().insert(principal);
                        srv.call(req).await
                    }
                    Ok(Err(RepositoryError::NotFound(_))) => {
                        debug!("dev bypass for unknown user {}", search_id);
                        Err(ErrorUnauthorized("unknown user"))
                    }
                    Ok(Err(e)) => {
                        error!("dev bypass user lookup failed: {}", e);
                        Err(ErrorUnauthorized("user lookup failed"))
                    }
                    Err(e) => {
                        error!("dev bypass user lookup blocking error: {}", e);
                        Err(ErrorUnauthorized("user lookup failed"))
                    }
                }
            });
        }

        let inner = self.inner.clone();
        let srv = self.service.clone();
        Box::pin(async move {
            let profile = match verify_session_jwt(&token, &inner.session_cfg) {
                Ok(p) => p,
                Err(e) => {
                    debug!("session token rejected: {}", e);
                    return Err(ErrorUnauthorized("unauthorized"));
                }
            };

            let user_ops = inner.user_ops.clone();
            let upsert_res = actix_web::web::block(move || user_ops.upsert_user(profile)).await;

            match upsert_res {
                Ok(Ok(user)) => {
                    req.extensions_mut().insert(Principal {
                        user_id: user.user_id,
                        role: user.role,
                    });
                    srv.call(req).await
                }
                Ok(Err(e)) => {
                    error!("user upsert failed: {}", e);
                    Err(ErrorUnauthorized("user upsert failed"))
                }
                Err(e) => {
                    error!("user upsert blocking error: {}", e);
                    Err(ErrorUnauthorized("user upsert failed"))
                }
            }
        })
    }
}
